//! Create a new project or journey post

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::{Category, ContentDate, JourneyFrontMatter, ProjectFrontMatter};
use crate::Folio;

/// Scaffold a content file for `title` and return its path
pub fn create_item(folio: &Folio, category: Category, title: &str) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let extension = folio
        .config
        .extensions
        .first()
        .map(String::as_str)
        .unwrap_or("mdx");

    let target_dir = folio.content_dir.join(category.dir_name());
    let file_path = target_dir.join(format!("{}.{}", slug, extension));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let date = ContentDate::parse(&today)
        .ok_or_else(|| anyhow::anyhow!("Failed to build a date from {:?}", today))?;

    let content = match category {
        Category::Projects => scaffold(&ProjectFrontMatter {
            title: title.to_string(),
            description: String::new(),
            tech: Vec::new(),
            preview_image: format!("/images/{}.png", slug),
            date,
            live_url: None,
            source_url: None,
        })?,
        Category::Journey => scaffold(&JourneyFrontMatter {
            title: title.to_string(),
            date,
            excerpt: String::new(),
            tags: Vec::new(),
        })?,
    };

    fs::create_dir_all(&target_dir)?;
    fs::write(&file_path, content)?;

    tracing::info!("Created {} {:?}", category.singular(), file_path);
    Ok(file_path)
}

fn scaffold<F: Serialize>(front_matter: &F) -> Result<String> {
    let header = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{}---\n\n", header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Journey, Projects};
    use tempfile::TempDir;

    #[test]
    fn test_create_project_is_readable() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let path = create_item(&folio, Category::Projects, "Project Subay").unwrap();
        assert_eq!(path, tmp.path().join("content/projects/project-subay.mdx"));

        let item = folio
            .reader()
            .get_by_slug::<Projects>("project-subay")
            .unwrap();
        assert_eq!(item.front_matter.title, "Project Subay");
        assert_eq!(item.front_matter.preview_image, "/images/project-subay.png");
        assert!(item.body.is_empty());
    }

    #[test]
    fn test_create_post_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        create_item(&folio, Category::Journey, "Week One").unwrap();
        assert!(create_item(&folio, Category::Journey, "Week One").is_err());

        let post = folio.reader().get_by_slug::<Journey>("week-one").unwrap();
        assert_eq!(post.front_matter.excerpt, "");
    }
}
