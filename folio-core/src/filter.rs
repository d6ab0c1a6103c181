use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Which documents a build is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Drafts are left out of every listing.
    #[default]
    Published,
    /// Everything is listed, drafts included.
    Preview,
}

impl Mode {
    pub fn admits(self, document: &Document) -> bool {
        match self {
            Mode::Published => !document.draft,
            Mode::Preview => true,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Published => f.write_str("published"),
            Mode::Preview => f.write_str("preview"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "published" => Ok(Mode::Published),
            "preview" => Ok(Mode::Preview),
            other => Err(format!("unknown mode `{other}`, expected `published` or `preview`")),
        }
    }
}

/// The documents visible in `mode`, in their original order.
pub fn visible(documents: &[Document], mode: Mode) -> Vec<&Document> {
    let visible: Vec<&Document> = documents.iter().filter(|d| mode.admits(d)).collect();

    let hidden = documents.len() - visible.len();
    if hidden > 0 {
        tracing::debug!(hidden, %mode, "drafts left out");
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::doc;

    fn corpus() -> Vec<Document> {
        let mut draft = doc("posts/scenario-tests.md", "2021-06-01");
        draft.draft = true;
        vec![doc("posts/a.md", "2021-04-22"), draft, doc("posts/b.md", "2021-04-23")]
    }

    #[test]
    fn test_published_mode_drops_drafts() {
        let docs = corpus();
        let ids: Vec<_> = visible(&docs, Mode::Published)
            .iter()
            .map(|d| d.identity.as_str())
            .collect();
        assert_eq!(ids, ["posts/a.md", "posts/b.md"]);
    }

    #[test]
    fn test_preview_mode_keeps_everything() {
        let docs = corpus();
        assert_eq!(visible(&docs, Mode::Preview).len(), 3);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Preview".parse::<Mode>(), Ok(Mode::Preview));
        assert_eq!("published".parse::<Mode>(), Ok(Mode::Published));
        assert!("draft".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Published);
    }
}
