use std::collections::HashMap;

use serde::Serialize;

use crate::document::{Document, Identity, newest_first};

/// Visible documents in reverse chronological order, with neighbour lookup.
///
/// `next` points at the newer neighbour and `prev` at the older one, the way
/// a blog's "newer post" / "older post" links read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sequence {
    order: Vec<Identity>,
    #[serde(skip)]
    positions: HashMap<Identity, usize>,
}

impl Sequence {
    pub fn new<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut sorted: Vec<&Document> = documents.into_iter().collect();
        sorted.sort_by(|a, b| newest_first(a, b));

        let order: Vec<Identity> = sorted.into_iter().map(|d| d.identity.clone()).collect();
        let positions = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Self { order, positions }
    }

    /// Identities, newest first.
    pub fn order(&self) -> &[Identity] {
        &self.order
    }

    pub fn position(&self, identity: &Identity) -> Option<usize> {
        self.positions.get(identity).copied()
    }

    /// The next newer document.
    pub fn next(&self, identity: &Identity) -> Option<&Identity> {
        let i = self.position(identity)?;
        i.checked_sub(1).map(|j| &self.order[j])
    }

    /// The next older document.
    pub fn prev(&self, identity: &Identity) -> Option<&Identity> {
        let i = self.position(identity)?;
        self.order.get(i + 1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
