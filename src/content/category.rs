//! Content categories and the header schema each one binds

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::date::ContentDate;
use super::item::{JourneyFrontMatter, ProjectFrontMatter};

/// One of the two kinds of authored content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Projects,
    Journey,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Projects, Category::Journey];

    /// Directory name under the content root, also the URL prefix
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Projects => "projects",
            Category::Journey => "journey",
        }
    }

    /// Human name of a single item
    pub fn singular(&self) -> &'static str {
        match self {
            Category::Projects => "project",
            Category::Journey => "post",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown content category: {0} (expected projects or journey)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "projects" | "project" => Ok(Category::Projects),
            "journey" | "post" | "posts" => Ok(Category::Journey),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Fields every category header exposes, whatever its schema
pub trait FrontMatterSchema: DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync {
    fn title(&self) -> &str;

    fn date(&self) -> &ContentDate;

    /// Short text used for listings and meta descriptions
    fn summary(&self) -> &str;

    /// Ordered labels (tech stack or tags)
    fn labels(&self) -> &[String];

    fn preview_image(&self) -> Option<&str> {
        None
    }
}

/// Binds a category to its header type
pub trait ContentSchema {
    const CATEGORY: Category;
    type FrontMatter: FrontMatterSchema;
}

/// Project case studies
#[derive(Debug, Clone, Copy)]
pub struct Projects;

/// Journey blog posts
#[derive(Debug, Clone, Copy)]
pub struct Journey;

impl ContentSchema for Projects {
    const CATEGORY: Category = Category::Projects;
    type FrontMatter = ProjectFrontMatter;
}

impl ContentSchema for Journey {
    const CATEGORY: Category = Category::Journey;
    type FrontMatter = JourneyFrontMatter;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!("projects".parse::<Category>().unwrap(), Category::Projects);
        assert_eq!("Project".parse::<Category>().unwrap(), Category::Projects);
        assert_eq!("journey".parse::<Category>().unwrap(), Category::Journey);
        assert_eq!("posts".parse::<Category>().unwrap(), Category::Journey);
    }

    #[test]
    fn test_unknown_category() {
        let err = "blog".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownCategory("blog".to_string()));
        assert!(err.to_string().contains("expected projects or journey"));
    }

    #[test]
    fn test_display_matches_dir_name() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.dir_name());
        }
    }
}
