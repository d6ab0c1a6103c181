use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::document::{Document, Identity};
use crate::error::PipelineError;
use crate::filter::Mode;
use crate::markdown::{Digest, digest};
use crate::related::SeriesIndex;
use crate::sequence::Sequence;
use crate::slug::Permalinks;
use crate::tags::TagIndex;

/// Immutable result of one pipeline run.
///
/// Listings (`documents`, `tags`, `series`, prev/next, related) only ever see
/// the documents visible in `mode`. Direct lookup by identity sees all of them.
#[derive(Debug)]
pub struct Site {
    pub(crate) mode: Mode,
    pub(crate) documents: BTreeMap<Identity, Document>,
    pub(crate) permalinks: Permalinks,
    pub(crate) sequence: Sequence,
    pub(crate) tags: TagIndex,
    pub(crate) series: SeriesIndex,
    pub(crate) related: BTreeMap<Identity, Vec<Identity>>,
}

impl Site {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Visible documents, newest first.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.sequence
            .order()
            .iter()
            .filter_map(|identity| self.documents.get(identity))
    }

    /// Any loaded document, drafts included.
    pub fn document(&self, identity: &Identity) -> Option<&Document> {
        self.documents.get(identity)
    }

    /// Number of documents loaded, visible or not.
    pub fn loaded(&self) -> usize {
        self.documents.len()
    }

    pub fn permalink(&self, identity: &Identity) -> Option<&str> {
        self.permalinks.url(identity)
    }

    pub fn prev(&self, identity: &Identity) -> Option<&Document> {
        self.sequence
            .prev(identity)
            .and_then(|id| self.documents.get(id))
    }

    pub fn next(&self, identity: &Identity) -> Option<&Document> {
        self.sequence
            .next(identity)
            .and_then(|id| self.documents.get(id))
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn tags(&self) -> &TagIndex {
        &self.tags
    }

    pub fn series(&self) -> &SeriesIndex {
        &self.series
    }

    pub fn related(&self, identity: &Identity) -> &[Identity] {
        self.related
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The serializable view handed to the rendering layer.
    pub fn manifest(&self) -> Manifest {
        let documents = self
            .documents()
            .map(|document| self.manifest_entry(document))
            .collect();

        let tags = self
            .tags
            .iter()
            .map(|(tag, entry)| ManifestTag {
                name: tag.to_string(),
                url: entry.url.clone(),
                documents: entry.documents.iter().filter_map(|id| self.link(id)).collect(),
            })
            .collect();

        let series = self
            .series
            .iter()
            .map(|(name, members)| ManifestSeries {
                name: name.to_string(),
                parts: members.iter().filter_map(|id| self.link(id)).collect(),
            })
            .collect();

        Manifest {
            mode: self.mode,
            documents,
            tags,
            series,
        }
    }

    /// Write the manifest as pretty JSON, creating parent directories.
    pub fn write_manifest(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_string_pretty(&self.manifest())?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        std::fs::write(path, json).map_err(|e| PipelineError::io(path, e))?;

        tracing::info!("Wrote manifest to {}", path.display());
        Ok(())
    }

    fn link(&self, identity: &Identity) -> Option<Link> {
        let document = self.documents.get(identity)?;
        Some(Link {
            identity: identity.clone(),
            title: document.title.clone(),
            url: self.permalinks.url(identity)?.to_string(),
        })
    }

    fn manifest_entry(&self, document: &Document) -> ManifestEntry {
        let identity = &document.identity;

        ManifestEntry {
            identity: identity.clone(),
            url: self.permalinks.url(identity).unwrap_or_default().to_string(),
            title: document.title.clone(),
            date: document.date,
            draft: document.draft,
            tags: document
                .tags
                .iter()
                .filter_map(|tag| {
                    self.tags.get(tag).map(|entry| TagLink {
                        name: tag.clone(),
                        url: entry.url.clone(),
                    })
                })
                .collect(),
            prev: self.sequence.prev(identity).and_then(|id| self.link(id)),
            next: self.sequence.next(identity).and_then(|id| self.link(id)),
            related: self.related(identity).iter().filter_map(|id| self.link(id)).collect(),
            series: self.series.position(identity).map(|position| SeriesLink {
                name: position.name.to_string(),
                part: position.part,
                of: position.of,
            }),
            digest: digest(document),
            extra: document.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub mode: Mode,
    pub documents: Vec<ManifestEntry>,
    pub tags: Vec<ManifestTag>,
    pub series: Vec<ManifestSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub identity: Identity,
    pub url: String,
    pub title: String,
    pub date: NaiveDate,
    pub draft: bool,
    pub tags: Vec<TagLink>,
    pub prev: Option<Link>,
    pub next: Option<Link>,
    pub related: Vec<Link>,
    pub series: Option<SeriesLink>,
    #[serde(flatten)]
    pub digest: Digest,
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub identity: Identity,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesLink {
    pub name: String,
    pub part: usize,
    pub of: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestTag {
    pub name: String,
    pub url: String,
    pub documents: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestSeries {
    pub name: String,
    pub parts: Vec<Link>,
}
