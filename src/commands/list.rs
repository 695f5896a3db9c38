//! List site content

use anyhow::Result;

use crate::content::{Category, FrontMatterSchema, Journey, Metadata, Projects};
use crate::Folio;

/// List one category, or both when none is given
pub fn run(folio: &Folio, category: Option<Category>) -> Result<()> {
    let categories = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    let reader = folio.reader();
    for category in categories {
        let lines = match category {
            Category::Projects => format_listing(&reader.list_metadata::<Projects>()?),
            Category::Journey => format_listing(&reader.list_metadata::<Journey>()?),
        };

        println!("{} ({}):", capitalize(category.dir_name()), lines.len());
        for line in lines {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn format_listing<F: FrontMatterSchema>(items: &[Metadata<F>]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            format!(
                "{} - {} [{}]",
                item.front_matter.date().ymd(),
                item.front_matter.title(),
                item.slug
            )
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
