//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary; there is no theme directory to
//! install.

use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::ContentDate;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Output is HTML we build ourselves; templates escape text fields explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("project.html", include_str!("site/project.html")),
            ("journey.html", include_str!("site/journey.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
            ("partials/badges.html", include_str!("site/partials/badges.html")),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: reformat a front-matter date with a chrono format string
///
/// Values that are not recognizable dates pass through unchanged.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    let formatted = ContentDate::parse(&s)
        .map(|date| date.format(&format))
        .unwrap_or(s);

    Ok(tera::Value::String(formatted))
}
