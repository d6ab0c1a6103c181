pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod frontmatter;
pub mod markdown;
pub mod related;
pub mod scanner;
pub mod sequence;
pub mod site;
pub mod slug;
pub mod tags;

// Re-export main types
pub use builder::SiteBuilder;
pub use document::{Document, Identity};
pub use error::{CollisionError, DateParseError, ParseError, ParseErrorKind, PipelineError};
pub use filter::Mode;
pub use scanner::{ContentScanner, load_document};
pub use site::{Manifest, Site};
pub use slug::slugify;
pub use tags::TagIndex;
