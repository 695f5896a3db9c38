//! Page resolver - maps reader outcomes onto what a page handler renders

use crate::content::{Category, ContentError, ContentItem, ContentReader, ContentSchema};

/// Outcome of looking up a page
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<F> {
    /// The item exists and can be rendered
    Found(ContentItem<F>),
    /// No such slug in the category; render the category's not-found view
    NotFound { category: Category, slug: String },
}

impl<F> Resolution<F> {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound { .. })
    }

    pub fn found(self) -> Option<ContentItem<F>> {
        match self {
            Resolution::Found(item) => Some(item),
            Resolution::NotFound { .. } => None,
        }
    }
}

/// Resolves `(category, slug)` requests against a [`ContentReader`]
#[derive(Debug, Clone)]
pub struct PageResolver {
    reader: ContentReader,
}

impl PageResolver {
    pub fn new(reader: ContentReader) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &ContentReader {
        &self.reader
    }

    /// Load the item for a detail page
    ///
    /// A missing slug becomes [`Resolution::NotFound`]. Malformed front matter
    /// and I/O failures are returned as errors for the caller to surface as
    /// a content error.
    pub fn resolve<S: ContentSchema>(
        &self,
        slug: &str,
    ) -> Result<Resolution<S::FrontMatter>, ContentError> {
        match self.reader.get_by_slug::<S>(slug) {
            Ok(item) => Ok(Resolution::Found(item)),
            Err(ContentError::NotFound { category, slug }) => {
                tracing::debug!("No {} named {:?}", category.singular(), slug);
                Ok(Resolution::NotFound { category, slug })
            }
            Err(e) => {
                tracing::error!("Failed to resolve {}/{}: {}", S::CATEGORY, slug, e);
                Err(e)
            }
        }
    }
}
