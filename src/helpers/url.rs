//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;
use crate::content::Category;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/projects/subay/") // -> "/portfolio/projects/subay/"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.base_url(), url_for(config, path))
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Site-relative path of a detail page, e.g. `projects/subay/`
pub fn item_path(category: Category, slug: &str) -> String {
    format!("{}/{}/", category.dir_name(), encode_segment(slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com/".to_string(),
            root: "/portfolio/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/static/me.png"), "/portfolio/static/me.png");
        assert_eq!(url_for(&config, ""), "/portfolio/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "journey/first/"),
            "https://example.com/portfolio/journey/first/"
        );
    }

    #[test]
    fn test_item_path_encodes_slug() {
        assert_eq!(item_path(Category::Projects, "subay"), "projects/subay/");
        assert_eq!(
            item_path(Category::Journey, "第一篇"),
            "journey/%E7%AC%AC%E4%B8%80%E7%AF%87/"
        );
    }
}
