//! Content module - categories, front matter, the reader and Markdown rendering

mod category;
mod date;
pub mod error;
pub mod frontmatter;
mod item;
mod markdown;
pub mod reader;

pub use category::{Category, ContentSchema, FrontMatterSchema, Journey, Projects, UnknownCategory};
pub use date::ContentDate;
pub use error::ContentError;
pub use frontmatter::{Document, FrontMatterError, FrontMatterParser, MatterParser};
pub use item::{
    ContentItem, JourneyFrontMatter, JourneyMetadata, JourneyPost, Metadata, Project,
    ProjectFrontMatter, ProjectMetadata,
};
pub use markdown::MarkdownRenderer;
pub use reader::ContentReader;
