use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::document::{Document, Identity};
use crate::error::PipelineError;
use crate::filter::{self, Mode};
use crate::related::{SeriesIndex, related_posts};
use crate::scanner::ContentScanner;
use crate::sequence::Sequence;
use crate::site::Site;
use crate::slug::Permalinks;
use crate::tags::TagIndex;

/// Collects configuration and content, then runs the pipeline once.
pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    documents: Vec<Document>,
    mode: Mode,
    config: PipelineConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            documents: Vec::new(),
            mode: Mode::Published,
            config: PipelineConfig::default(),
        }
    }

    // Content sources
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn add_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn add_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents.extend(documents);
        self
    }

    // Build options
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Site, PipelineError> {
        let mut documents = self.documents;
        match &self.source_dir {
            Some(dir) => documents.extend(ContentScanner::new(dir).scan()?),
            None if documents.is_empty() => return Err(PipelineError::MissingSourceDir),
            None => {}
        }

        // Whole corpus, drafts included, before anything is filtered out.
        let permalinks = Permalinks::resolve(&documents, &self.config.permalink_prefix)?;

        let visible = filter::visible(&documents, self.mode);
        let sequence = Sequence::new(visible.iter().copied());
        let tags = TagIndex::build(visible.iter().copied(), &self.config.tag_prefix);
        let series = SeriesIndex::build(visible.iter().copied());
        let related = related_posts(&visible, self.config.related_limit);

        tracing::info!(
            mode = %self.mode,
            loaded = documents.len(),
            visible = sequence.len(),
            tags = tags.len(),
            series = series.len(),
            "site built"
        );

        let documents = documents
            .into_iter()
            .map(|d| (d.identity.clone(), d))
            .collect::<std::collections::BTreeMap<Identity, Document>>();

        Ok(Site {
            mode: self.mode,
            documents,
            permalinks,
            sequence,
            tags,
            series,
            related,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::{doc, tagged};
    use crate::error::CollisionError;

    #[test]
    fn test_needs_some_content() {
        assert!(matches!(SiteBuilder::new().build(), Err(PipelineError::MissingSourceDir)));
    }

    #[test]
    fn test_collision_among_drafts_still_fails() {
        let mut draft = doc("posts/scenario-tests/index.md", "2021-06-01");
        draft.draft = true;
        let result = SiteBuilder::new()
            .add_document(doc("posts/scenario-tests.md", "2021-05-01"))
            .add_document(draft)
            .build();
        assert!(matches!(
            result,
            Err(PipelineError::Collision(CollisionError::Slug { .. }))
        ));
    }

    #[test]
    fn test_duplicate_identity_is_a_collision() {
        let result = SiteBuilder::new()
            .add_document(doc("posts/a.md", "2021-05-01"))
            .add_document(doc("posts/a.md", "2021-05-02"))
            .build();
        assert!(matches!(result, Err(PipelineError::Collision(_))));
    }

    #[test]
    fn test_clashing_tag_slugs_still_build() {
        let site = SiteBuilder::new()
            .add_document(tagged("posts/a.md", "2021-05-01", &["C#"]))
            .add_document(tagged("posts/b.md", "2021-05-02", &["C"]))
            .build()
            .unwrap();

        assert_eq!(site.tags().len(), 2);
        assert_eq!(site.tags().get("C").unwrap().url, "/tags/c/");
        assert_eq!(site.tags().get("C#").unwrap().url, "/tags/c-2/");
    }

    #[test]
    fn test_config_flows_into_urls() {
        let site = SiteBuilder::new()
            .add_document(tagged("posts/a.md", "2021-05-01", &["EF Core"]))
            .pipeline_config(PipelineConfig {
                permalink_prefix: "blog".into(),
                tag_prefix: "topics".into(),
                related_limit: 0,
            })
            .build()
            .unwrap();

        assert_eq!(site.permalink(&Identity::new("posts/a.md")), Some("/blog/posts/a/"));
        assert_eq!(site.tags().get("EF Core").unwrap().url, "/topics/ef-core/");
    }
}
