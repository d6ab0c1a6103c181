use std::path::PathBuf;

use thiserror::Error;

use crate::document::Identity;

/// Top-level error for a pipeline run. Every variant is fatal to the build.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Collision(#[from] CollisionError),

    #[error("{identity}: cannot derive a slug from this path")]
    InvalidIdentity { identity: Identity },

    #[error("Source directory not specified")]
    MissingSourceDir,

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A document whose front matter could not be turned into a [`crate::Document`].
#[derive(Error, Debug)]
#[error("{identity}: {kind}")]
pub struct ParseError {
    pub identity: Identity,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(identity: Identity, kind: ParseErrorKind) -> Self {
        Self { identity, kind }
    }

    /// The front-matter field at fault, if the failure is about a single field.
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            ParseErrorKind::MissingField(field)
            | ParseErrorKind::EmptyField(field)
            | ParseErrorKind::MalformedField { field, .. } => Some(*field),
            ParseErrorKind::Date(_) => Some("date"),
            _ => None,
        }
    }

    pub fn is_date_error(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Date(_))
    }
}

#[derive(Error, Debug)]
pub enum ParseErrorKind {
    #[error("missing front matter block")]
    MissingFrontMatter,

    #[error("front matter block opened with `{0}` is never closed")]
    UnterminatedFrontMatter(&'static str),

    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("front matter must be a table of key/value pairs")]
    NotATable,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("field `{field}` is malformed: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// The `date` field did not parse to a calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("field `date` has unparseable value `{value}`")]
pub struct DateParseError {
    pub value: String,
}

/// Two documents resolved to the same URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("slug `{slug}` is claimed by both {first} and {second}")]
    Slug {
        slug: String,
        first: Identity,
        second: Identity,
    },
}
