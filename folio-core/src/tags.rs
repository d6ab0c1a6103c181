use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::document::{Document, Identity, newest_first};
use crate::slug::{permalink, slugify};

/// Tag → documents bearing it, newest first.
///
/// Only tags that at least one indexed document carries are present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagIndex {
    tags: BTreeMap<String, TagEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    pub slug: String,
    pub url: String,
    pub documents: Vec<Identity>,
}

impl TagIndex {
    /// Build the index from the documents visible to this build.
    ///
    /// Distinct tags that slugify alike (`C` and `C#`) all keep their own
    /// page: in tag order, the first takes the plain slug and the rest get
    /// `-2`, `-3`, ... appended.
    pub fn build<'a, I>(documents: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut grouped: BTreeMap<&str, Vec<&Document>> = BTreeMap::new();
        for document in documents {
            for tag in &document.tags {
                grouped.entry(tag.as_str()).or_default().push(document);
            }
        }

        let mut taken: BTreeSet<String> = BTreeSet::new();
        let mut tags = BTreeMap::new();
        for (tag, mut members) in grouped {
            let base = slugify(tag);
            let slug = unique_slug(&base, &taken);
            if slug != base {
                tracing::debug!(tag, %slug, "tag slug already taken, suffixed");
            }
            taken.insert(slug.clone());

            members.sort_by(|a, b| newest_first(a, b));
            tags.insert(
                tag.to_string(),
                TagEntry {
                    url: permalink(prefix, &slug),
                    slug,
                    documents: members.into_iter().map(|d| d.identity.clone()).collect(),
                },
            );
        }

        tracing::debug!(tags = tags.len(), "built tag index");
        Self { tags }
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.tags.get(tag)
    }

    /// Documents tagged `tag`, newest first. Empty for unknown tags.
    pub fn documents(&self, tag: &str) -> &[Identity] {
        self.tags
            .get(tag)
            .map(|entry| entry.documents.as_slice())
            .unwrap_or_default()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.documents(tag).len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagEntry)> {
        self.tags.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

fn unique_slug(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::tagged;
    use crate::filter::{Mode, visible};

    #[test]
    fn test_documents_sorted_newest_first() {
        let docs = vec![
            tagged("b.md", "2021-04-22", &["efcore"]),
            tagged("c.md", "2021-05-03", &["efcore", "source-generators"]),
            tagged("a.md", "2021-04-22", &["efcore"]),
        ];
        let index = TagIndex::build(&docs, "tags");

        let ids: Vec<_> = index.documents("efcore").iter().map(Identity::as_str).collect();
        assert_eq!(ids, ["c.md", "a.md", "b.md"]);
        assert_eq!(index.count("source-generators"), 1);
        assert_eq!(index.get("efcore").unwrap().url, "/tags/efcore/");
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let index = TagIndex::build(&Vec::<Document>::new(), "tags");
        assert!(index.is_empty());
        assert!(index.documents("nope").is_empty());
        assert!(!index.contains("nope"));
    }

    #[test]
    fn test_draft_only_tags_are_absent_when_published() {
        let mut draft = tagged("draft.md", "2021-06-01", &["testing", "efcore"]);
        draft.draft = true;
        let docs = vec![draft, tagged("live.md", "2021-04-22", &["efcore"])];

        let published = TagIndex::build(visible(&docs, Mode::Published), "tags");
        assert!(!published.contains("testing"));
        assert_eq!(published.count("efcore"), 1);

        let preview = TagIndex::build(visible(&docs, Mode::Preview), "tags");
        assert!(preview.contains("testing"));
        assert_eq!(preview.count("efcore"), 2);
    }

    #[test]
    fn test_tags_with_same_slug_get_suffixes() {
        let docs = vec![
            tagged("a.md", "2021-04-22", &["C#"]),
            tagged("b.md", "2021-04-23", &["C", "C++"]),
        ];
        let index = TagIndex::build(&docs, "tags");

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("C").unwrap().url, "/tags/c/");
        assert_eq!(index.get("C#").unwrap().url, "/tags/c-2/");
        assert_eq!(index.get("C++").unwrap().url, "/tags/c-3/");
        assert_eq!(index.documents("C#"), [Identity::new("a.md")]);
    }

    #[test]
    fn test_suffix_skips_slugs_already_in_use() {
        let docs = vec![tagged("a.md", "2021-04-22", &["C", "C#", "c-2"])];
        let index = TagIndex::build(&docs, "tags");

        let slugs: BTreeSet<_> = index.iter().map(|(_, entry)| entry.slug.as_str()).collect();
        assert_eq!(slugs.len(), 3);
        assert_eq!(index.get("C#").unwrap().slug, "c-2");
        assert_eq!(index.get("c-2").unwrap().slug, "c-2-2");
    }

    #[test]
    fn test_iteration_is_sorted_by_tag() {
        let docs = vec![tagged("a.md", "2021-04-22", &["zeta", "alpha", "mid"])];
        let index = TagIndex::build(&docs, "labels");
        let tags: Vec<_> = index.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, ["alpha", "mid", "zeta"]);
        assert_eq!(index.get("mid").unwrap().url, "/labels/mid/");
    }
}
