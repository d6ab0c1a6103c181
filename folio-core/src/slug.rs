use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::document::{Document, Identity};
use crate::error::{CollisionError, PipelineError};

static HYPHEN_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// File stems that stand for their parent directory (page bundles).
const BUNDLE_STEMS: [&str; 3] = ["index", "_index", "readme"];

/// Convert a string to a URL-safe slug.
///
/// Lowercases, turns whitespace and underscores into hyphens, drops anything
/// that is not alphanumeric or a hyphen, collapses hyphen runs and trims
/// hyphens from both ends. Unicode letters survive.
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| match g {
            " " | "_" | "\t" | "\n" | "\r\n" => Some("-"),
            _ => {
                let c = g.chars().next()?;
                (c.is_alphanumeric() || c == '-').then_some(g)
            }
        })
        .collect::<String>();

    HYPHEN_RUNS
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// The slug a document's identity resolves to: every path segment
/// slugified and joined with `/`, minus the extension. A bundle file
/// (`index.md` and friends) stands for its directory.
///
/// `None` when the path has nothing to build one from, or when a segment
/// slugifies to nothing.
pub fn slug_for(identity: &Identity) -> Option<String> {
    let path = Path::new(identity.as_str());
    let stem = path.file_stem()?.to_string_lossy();

    let mut segments: Vec<String> = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if !BUNDLE_STEMS.contains(&stem.to_lowercase().as_str()) {
        segments.push(stem.into_owned());
    }

    let slugs: Vec<String> = segments.iter().map(|s| slugify(s)).collect();
    if slugs.is_empty() || slugs.iter().any(String::is_empty) {
        return None;
    }
    Some(slugs.join("/"))
}

/// Join a prefix and a slug into a `/prefix/slug/` URL path. An empty
/// prefix gives `/slug/`.
pub fn permalink(prefix: &str, slug: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("/{slug}/")
    } else {
        format!("/{prefix}/{slug}/")
    }
}

/// Canonical URL for every document in a corpus.
///
/// Built in one pass over the whole corpus so that collisions are caught
/// before anything is published.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Permalinks {
    by_identity: BTreeMap<Identity, String>,
    slugs: BTreeMap<Identity, String>,
}

impl Permalinks {
    pub fn resolve<'a, I>(documents: I, prefix: &str) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut owners: BTreeMap<String, Identity> = BTreeMap::new();
        let mut resolved = Permalinks::default();

        for document in documents {
            let identity = &document.identity;
            let slug = slug_for(identity).ok_or_else(|| PipelineError::InvalidIdentity {
                identity: identity.clone(),
            })?;

            if let Some(first) = owners.get(&slug) {
                // Report the pair in identity order regardless of input order.
                let (first, second) = if first <= identity {
                    (first.clone(), identity.clone())
                } else {
                    (identity.clone(), first.clone())
                };
                return Err(CollisionError::Slug { slug, first, second }.into());
            }

            tracing::debug!(%identity, %slug, "resolved slug");
            owners.insert(slug.clone(), identity.clone());
            resolved
                .by_identity
                .insert(identity.clone(), permalink(prefix, &slug));
            resolved.slugs.insert(identity.clone(), slug);
        }

        Ok(resolved)
    }

    pub fn url(&self, identity: &Identity) -> Option<&str> {
        self.by_identity.get(identity).map(String::as_str)
    }

    pub fn slug(&self, identity: &Identity) -> Option<&str> {
        self.slugs.get(identity).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}
