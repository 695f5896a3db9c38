//! Helper functions shared by the generator, templates and server

mod html;
mod url;

pub use html::*;
pub use url::*;
