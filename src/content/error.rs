//! Errors raised while reading content

use std::path::PathBuf;
use thiserror::Error;

use super::category::Category;
use super::frontmatter::FrontMatterError;

/// Failure modes of the content reader
#[derive(Error, Debug)]
pub enum ContentError {
    /// No file maps to the requested slug
    #[error("{category} item not found: {slug}")]
    NotFound { category: Category, slug: String },

    /// A file exists but its front matter does not fit the category schema
    #[error("invalid front matter in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    /// Any other file-system failure
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ContentError::Parse { .. })
    }
}

/// Result alias for content operations
pub type Result<T> = std::result::Result<T, ContentError>;
