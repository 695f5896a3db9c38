//! folio: a portfolio site built from Markdown content files
//!
//! Projects and journey posts live as `.mdx`/`.md` files with front matter
//! under `content/<category>/`. The crate reads them into typed records,
//! resolves detail pages by slug, and renders the site with built-in Tera
//! templates, either as static files or from a live development server.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod resolver;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// A portfolio site rooted at a directory
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content root holding `projects/` and `journey/`
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim
    pub static_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    ///
    /// A missing `_config.yml` falls back to the defaults.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Content reader configured from the site settings
    pub fn reader(&self) -> content::ContentReader {
        let reader = content::ContentReader::new(&self.content_dir);
        if self.config.extensions.is_empty() {
            reader
        } else {
            reader.with_extensions(self.config.extensions.iter().cloned())
        }
    }

    pub fn resolver(&self) -> resolver::PageResolver {
        resolver::PageResolver::new(self.reader())
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.content_dir, tmp.path().join("content"));
        assert_eq!(folio.public_dir, tmp.path().join("public"));
        assert_eq!(folio.config.title, "Portfolio");
    }

    #[test]
    fn test_directories_follow_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "content_dir: posts\npublic_dir: dist\nextensions: [md]\n",
        )
        .unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        assert_eq!(folio.content_dir, tmp.path().join("posts"));
        assert_eq!(folio.public_dir, tmp.path().join("dist"));
        assert_eq!(folio.reader().root(), tmp.path().join("posts"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "title: [unclosed\n").unwrap();
        assert!(Folio::new(tmp.path()).is_err());
    }
}
