use serde::{Deserialize, Serialize};

/// Contents of `folio.toml` that the pipeline itself cares about.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Leading URL segment for documents: `/{permalink_prefix}/{slug}/`.
    /// Empty by default, so URLs mirror the content tree.
    pub permalink_prefix: String,
    /// First URL segment for tag pages
    pub tag_prefix: String,
    /// How many related posts to keep per document; 0 turns them off
    pub related_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            permalink_prefix: String::new(),
            tag_prefix: "tags".into(),
            related_limit: 3,
        }
    }
}
