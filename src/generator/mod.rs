//! Generator module - renders pages with the built-in Tera templates
//!
//! The same renderer backs both the static build (`generate`) and the
//! development server, which renders pages on demand.

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{
    Category, ContentError, ContentItem, ContentSchema, FrontMatterSchema, Journey,
    MarkdownRenderer, Projects,
};
use crate::helpers::{encode_segment, escape_xml, full_url_for, item_path, url_for};
use crate::resolver::{PageResolver, Resolution};
use crate::templates::TemplateRenderer;
use crate::Folio;

/// How a rendered page should be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
    Error,
}

/// A page body with its status
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub status: PageStatus,
    pub html: String,
}

/// Counts reported after a static build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub projects: usize,
    pub posts: usize,
    pub assets: usize,
}

/// Page renderer and static site writer
pub struct Generator {
    folio: Folio,
    resolver: PageResolver,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
    /// Include error messages in error pages
    show_error_details: bool,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            folio: folio.clone(),
            resolver: folio.resolver(),
            templates: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::from_config(&folio.config.highlight),
            show_error_details: false,
        })
    }

    /// Show error messages on error pages (development server)
    pub fn with_error_details(mut self, show: bool) -> Self {
        self.show_error_details = show;
        self
    }

    pub fn resolver(&self) -> &PageResolver {
        &self.resolver
    }

    pub fn sitemap_enabled(&self) -> bool {
        self.folio.config.sitemap.enable
    }

    /// Context shared by every template
    fn base_context(&self) -> Context {
        let config = &self.folio.config;
        let mut context = Context::new();
        context.insert("config", config);
        context.insert("root", &url_for(config, ""));
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        context
    }

    /// Home page with both listings
    pub fn render_home(&self) -> Result<String> {
        let reader = self.resolver.reader();
        let projects = reader.list_metadata::<Projects>()?;
        let posts = reader.list_metadata::<Journey>()?;

        let mut context = self.base_context();
        context.insert("projects", &projects);
        context.insert("posts", &posts);

        self.templates.render("home.html", &context)
    }

    /// Detail page for `category/slug`, or its not-found or error page
    pub fn render_item_page(&self, category: Category, slug: &str) -> Result<RenderedPage> {
        match category {
            Category::Projects => self.render_item::<Projects>(slug),
            Category::Journey => self.render_item::<Journey>(slug),
        }
    }

    fn render_item<S: ContentSchema>(&self, slug: &str) -> Result<RenderedPage> {
        let page = match self.resolver.resolve::<S>(slug) {
            Ok(Resolution::Found(item)) => RenderedPage {
                status: PageStatus::Ok,
                html: self.render_detail(S::CATEGORY, &item)?,
            },
            Ok(Resolution::NotFound { category, .. }) => RenderedPage {
                status: PageStatus::NotFound,
                html: self.render_not_found(Some(category))?,
            },
            Err(e) => RenderedPage {
                status: PageStatus::Error,
                html: self.render_error(Some(&e))?,
            },
        };
        Ok(page)
    }

    fn render_detail<F: FrontMatterSchema>(
        &self,
        category: Category,
        item: &ContentItem<F>,
    ) -> Result<String> {
        let config = &self.folio.config;
        let fm = &item.front_matter;

        let mut context = self.base_context();
        context.insert("item", item);
        context.insert("content_html", &self.markdown.render(&item.body));
        context.insert("page_title", &format!("{} - {}", fm.title(), config.author));
        context.insert("page_description", fm.summary());
        context.insert("og_image", &fm.preview_image());
        context.insert(
            "canonical_url",
            &full_url_for(config, &item_path(category, &item.slug)),
        );

        let template = match category {
            Category::Projects => "project.html",
            Category::Journey => "journey.html",
        };
        self.templates.render(template, &context)
    }

    /// Global 404 page, or the category-specific one
    pub fn render_not_found(&self, category: Option<Category>) -> Result<String> {
        let author = &self.folio.config.author;
        let (heading, message, anchor, label) = match category {
            Some(Category::Projects) => (
                "Project Not Found",
                "This project doesn't exist or has been removed from the portfolio.",
                "#projects",
                "View All Projects",
            ),
            Some(Category::Journey) => (
                "Journey Post Not Found",
                "This journey post doesn't exist or has been removed.",
                "#journey",
                "View All Posts",
            ),
            None => (
                "Page Not Found",
                "Oops! The page you're looking for doesn't exist or has been moved.",
                "#projects",
                "View Projects",
            ),
        };

        let mut context = self.base_context();
        context.insert("page_title", &format!("{} | {}", heading, author));
        context.insert("heading", heading);
        context.insert("message", message);
        context.insert("back_anchor", anchor);
        context.insert("back_label", label);

        self.templates.render("not_found.html", &context)
    }

    /// Generic error page
    pub fn render_error(&self, error: Option<&ContentError>) -> Result<String> {
        let mut context = self.base_context();
        let details = error
            .filter(|_| self.show_error_details)
            .map(|e| e.to_string());
        context.insert("details", &details);

        self.templates.render("error.html", &context)
    }

    /// sitemap.xml listing the home page and every detail page
    pub fn render_sitemap(&self) -> Result<String> {
        let config = &self.folio.config;
        let reader = self.resolver.reader();
        let projects = reader.list_metadata::<Projects>()?;
        let posts = reader.list_metadata::<Journey>()?;

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        push_sitemap_url(&mut xml, &full_url_for(config, ""), &today, "weekly", "1.0");

        for project in &projects {
            let path = format!("projects/{}", encode_segment(&project.slug));
            push_sitemap_url(
                &mut xml,
                &full_url_for(config, &path),
                &project.front_matter.date.ymd(),
                "monthly",
                "0.8",
            );
        }

        for post in &posts {
            let path = format!("journey/{}", encode_segment(&post.slug));
            push_sitemap_url(
                &mut xml,
                &full_url_for(config, &path),
                &post.front_matter.date.ymd(),
                "monthly",
                "0.6",
            );
        }

        xml.push_str("</urlset>\n");
        Ok(xml)
    }

    /// Render the whole site into the public directory
    ///
    /// Malformed content aborts the build.
    pub fn generate(&self) -> Result<GenerateSummary> {
        let public_dir = &self.folio.public_dir;
        fs::create_dir_all(public_dir)?;

        // Drop detail pages of items that no longer exist
        for category in Category::ALL {
            let dir = public_dir.join(category.dir_name());
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
        }

        let assets = self.copy_static_assets()?;

        self.write_output("index.html", &self.render_home()?)?;
        let projects = self.generate_items::<Projects>()?;
        let posts = self.generate_items::<Journey>()?;

        self.write_output("404.html", &self.render_not_found(None)?)?;
        for category in Category::ALL {
            let html = self.render_not_found(Some(category))?;
            self.write_output(&format!("{}/404.html", category.dir_name()), &html)?;
        }

        if self.sitemap_enabled() {
            self.write_output("sitemap.xml", &self.render_sitemap()?)?;
            tracing::info!("Generated sitemap.xml");
        }

        Ok(GenerateSummary {
            projects,
            posts,
            assets,
        })
    }

    /// Pre-render every detail page of one category
    fn generate_items<S: ContentSchema>(&self) -> Result<usize> {
        let category = S::CATEGORY;
        let mut count = 0;

        for slug in self.resolver.reader().list_slugs(category)? {
            match self.resolver.resolve::<S>(&slug)? {
                Resolution::Found(item) => {
                    let html = self.render_detail(category, &item)?;
                    let rel = format!("{}/{}/index.html", category.dir_name(), slug);
                    self.write_output(&rel, &html)?;
                    count += 1;
                }
                Resolution::NotFound { .. } => {
                    tracing::warn!("{}/{} disappeared during generation", category, slug);
                }
            }
        }

        tracing::info!("Generated {} {} pages", count, category);
        Ok(count)
    }

    fn write_output(&self, rel: &str, content: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(rel);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy static assets (images, etc.) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.folio.static_dir;
        if !static_dir.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_hidden(path) {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}

fn push_sitemap_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(loc)));
    xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
    xml.push_str(&format!("    <priority>{}</priority>\n", priority));
    xml.push_str("  </url>\n");
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
