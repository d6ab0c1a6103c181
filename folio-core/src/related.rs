//! Grouping documents with each other: related posts by shared tags, and
//! named series.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::document::{Document, Identity, newest_first};

/// For every document, the documents that share the most tags with it.
pub fn related_posts(documents: &[&Document], limit: usize) -> BTreeMap<Identity, Vec<Identity>> {
    let mut related = BTreeMap::new();
    if limit == 0 {
        return related;
    }

    for &document in documents {
        let mut candidates: Vec<(usize, &Document)> = documents
            .iter()
            .filter(|other| other.identity != document.identity)
            .map(|&other| (document.tags.intersection(&other.tags).count(), other))
            .filter(|(shared, _)| *shared > 0)
            .collect();

        candidates.sort_by(|(shared_a, a), (shared_b, b)| {
            Reverse(shared_a)
                .cmp(&Reverse(shared_b))
                .then_with(|| newest_first(a, b))
        });

        let picks: Vec<Identity> = candidates
            .into_iter()
            .take(limit)
            .map(|(_, other)| other.identity.clone())
            .collect();
        if !picks.is_empty() {
            related.insert(document.identity.clone(), picks);
        }
    }

    related
}

/// Named series, each in reading order (oldest first).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesIndex {
    series: BTreeMap<String, Vec<Identity>>,
    #[serde(skip)]
    membership: HashMap<Identity, String>,
}

/// Where a document sits inside its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPosition<'a> {
    pub name: &'a str,
    /// 1-based
    pub part: usize,
    pub of: usize,
}

impl SeriesIndex {
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut grouped: BTreeMap<String, Vec<&Document>> = BTreeMap::new();
        for document in documents {
            if let Some(name) = &document.series {
                grouped.entry(name.clone()).or_default().push(document);
            }
        }

        let mut index = SeriesIndex::default();
        for (name, mut members) in grouped {
            // reverse of newest_first: oldest first, identity still ascending
            members.sort_by(|a, b| {
                a.date
                    .cmp(&b.date)
                    .then_with(|| a.identity.cmp(&b.identity))
            });
            for member in &members {
                index.membership.insert(member.identity.clone(), name.clone());
            }
            index
                .series
                .insert(name, members.into_iter().map(|d| d.identity.clone()).collect());
        }

        index
    }

    pub fn members(&self, name: &str) -> &[Identity] {
        self.series
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn position(&self, identity: &Identity) -> Option<SeriesPosition<'_>> {
        let name = self.membership.get(identity)?;
        let members = self.series.get(name)?;
        let index = members.iter().position(|m| m == identity)?;

        Some(SeriesPosition {
            name: name.as_str(),
            part: index + 1,
            of: members.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Identity])> {
        self.series
            .iter()
            .map(|(name, members)| (name.as_str(), members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
