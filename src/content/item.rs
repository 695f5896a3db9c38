//! Content records: per-category headers, listing metadata and full items

use serde::{Deserialize, Deserializer, Serialize};

use super::category::FrontMatterSchema;
use super::date::ContentDate;

/// Accept either `tags: rust` or `tags: [rust, web]`
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// Header of a project case study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFrontMatter {
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub tech: Vec<String>,
    pub preview_image: String,
    pub date: ContentDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl FrontMatterSchema for ProjectFrontMatter {
    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> &ContentDate {
        &self.date
    }

    fn summary(&self) -> &str {
        &self.description
    }

    fn labels(&self) -> &[String] {
        &self.tech
    }

    fn preview_image(&self) -> Option<&str> {
        Some(self.preview_image.as_str()).filter(|s| !s.is_empty())
    }
}

/// Header of a journey post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyFrontMatter {
    pub title: String,
    pub date: ContentDate,
    pub excerpt: String,
    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
}

impl FrontMatterSchema for JourneyFrontMatter {
    fn title(&self) -> &str {
        &self.title
    }

    fn date(&self) -> &ContentDate {
        &self.date
    }

    fn summary(&self) -> &str {
        &self.excerpt
    }

    fn labels(&self) -> &[String] {
        &self.tags
    }
}

/// Front matter plus slug, as returned by listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata<F> {
    pub slug: String,
    #[serde(flatten)]
    pub front_matter: F,
}

/// A single item with its un-rendered body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem<F> {
    pub slug: String,
    #[serde(flatten)]
    pub front_matter: F,
    pub body: String,
}

impl<F> ContentItem<F> {
    /// Drop the body, keeping what a listing would show
    pub fn into_metadata(self) -> Metadata<F> {
        Metadata {
            slug: self.slug,
            front_matter: self.front_matter,
        }
    }
}

pub type ProjectMetadata = Metadata<ProjectFrontMatter>;
pub type JourneyMetadata = Metadata<JourneyFrontMatter>;
pub type Project = ContentItem<ProjectFrontMatter>;
pub type JourneyPost = ContentItem<JourneyFrontMatter>;
