//! Print a single content item

use anyhow::Result;
use serde::Serialize;

use crate::content::{Category, ContentItem, ContentSchema, Journey, Projects};
use crate::resolver::Resolution;
use crate::Folio;

/// Print the header and body of `category/slug`
pub fn run(folio: &Folio, category: Category, slug: &str) -> Result<()> {
    let output = match category {
        Category::Projects => render::<Projects>(folio, slug)?,
        Category::Journey => render::<Journey>(folio, slug)?,
    };
    print!("{}", output);
    Ok(())
}

fn render<S: ContentSchema>(folio: &Folio, slug: &str) -> Result<String> {
    match folio.resolver().resolve::<S>(slug)? {
        Resolution::Found(item) => format_item(&item),
        Resolution::NotFound { category, slug } => {
            anyhow::bail!("{} not found: {}", category.singular(), slug)
        }
    }
}

fn format_item<F: Serialize>(item: &ContentItem<F>) -> Result<String> {
    let header = serde_yaml::to_string(&item.front_matter)?;
    Ok(format!("---\n{}---\n\n{}\n", header, item.body))
}
