//! Content reader - turns a category directory into typed records
//!
//! Every call goes back to the file system; nothing is cached, so a file
//! added between two calls shows up in the second one.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::category::{Category, ContentSchema, FrontMatterSchema};
use super::error::{ContentError, Result};
use super::frontmatter::{FrontMatterError, FrontMatterParser, MatterParser};
use super::item::{ContentItem, Metadata};

lazy_static! {
    /// A slug is a single path component that does not start with a dot
    static ref SLUG_RE: Regex = Regex::new(r"^[\p{L}\p{N}_][\p{L}\p{N}_.\-]*$").unwrap();
}

/// Default content file extensions, in lookup priority order
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["mdx", "md"];

/// Check whether `slug` can name a content file
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Reads content items from `<root>/<category>/<slug>.<ext>`
#[derive(Clone)]
pub struct ContentReader {
    root: PathBuf,
    extensions: Vec<String>,
    parser: Arc<dyn FrontMatterParser>,
}

impl ContentReader {
    /// Create a reader over a content root with the default extensions and parser
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            parser: Arc::new(MatterParser),
        }
    }

    /// Replace the recognised file extensions (without the leading dot)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Replace the front-matter parser
    pub fn with_parser<P: FrontMatterParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Slugs of every content file in the category, sorted
    ///
    /// A missing directory means nothing has been authored yet and yields an
    /// empty list.
    pub fn list_slugs(&self, category: Category) -> Result<Vec<String>> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            tracing::debug!("No {} directory at {:?}", category, dir);
            return Ok(Vec::new());
        }

        let mut slugs = BTreeSet::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_dangling_entry(&e) => {
                    tracing::warn!("Skipping dangling entry in {:?}: {}", dir, e);
                    continue;
                }
                Err(e) => return Err(walk_error(&dir, e)),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(slug) = self.slug_for(entry.path()) {
                slugs.insert(slug);
            }
        }

        Ok(slugs.into_iter().collect())
    }

    /// Front matter of every item in the category, newest first
    ///
    /// Items sharing a date keep their slug order. The first malformed
    /// header aborts the whole listing.
    pub fn list_metadata<S: ContentSchema>(&self) -> Result<Vec<Metadata<S::FrontMatter>>> {
        let mut items = Vec::new();

        for slug in self.list_slugs(S::CATEGORY)? {
            let item = self.get_by_slug::<S>(&slug)?;
            items.push(item.into_metadata());
        }

        items.sort_by(|a, b| b.front_matter.date().cmp(a.front_matter.date()));

        Ok(items)
    }

    /// Load one item with its body
    pub fn get_by_slug<S: ContentSchema>(&self, slug: &str) -> Result<ContentItem<S::FrontMatter>> {
        let category = S::CATEGORY;
        let not_found = || ContentError::NotFound {
            category,
            slug: slug.to_string(),
        };

        let path = self.locate(category, slug).ok_or_else(not_found)?;
        tracing::debug!("Reading {} {:?} from {:?}", category.singular(), slug, path);

        let raw = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                not_found()
            } else {
                ContentError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let parse_error = |source: FrontMatterError| ContentError::Parse {
            path: path.clone(),
            source,
        };

        let document = self.parser.parse(&raw).map_err(parse_error)?;
        let front_matter: S::FrontMatter = serde_json::from_value(document.header)
            .map_err(|e| parse_error(FrontMatterError::Schema(e)))?;

        Ok(ContentItem {
            slug: slug.to_string(),
            front_matter,
            body: document.body.to_string(),
        })
    }

    /// Path of the file backing `slug`, trying extensions in priority order
    fn locate(&self, category: Category, slug: &str) -> Option<PathBuf> {
        if !is_valid_slug(slug) {
            return None;
        }

        let dir = self.category_dir(category);
        self.extensions
            .iter()
            .map(|ext| dir.join(format!("{}.{}", slug, ext)))
            .find(|path| path.is_file())
    }

    /// Slug of a content file, or `None` for files the reader ignores
    fn slug_for(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        if !self.extensions.iter().any(|e| e == ext) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        if is_valid_slug(stem) {
            Some(stem.to_string())
        } else {
            tracing::warn!("Ignoring {:?}: file name is not a valid slug", path);
            None
        }
    }
}

impl std::fmt::Debug for ContentReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentReader")
            .field("root", &self.root)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// A broken symlink inside the category directory, not a failure to read it
fn is_dangling_entry(err: &walkdir::Error) -> bool {
    err.depth() > 0
        && err
            .io_error()
            .map_or(false, |io| io.kind() == io::ErrorKind::NotFound)
}

fn walk_error(dir: &Path, err: walkdir::Error) -> ContentError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    ContentError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Document, Journey, Projects};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project(title: &str, date: &str) -> String {
        format!(
            "---\ntitle: {}\ndescription: About {}\ntech: [Rust]\npreviewImage: /img/{}.png\ndate: {}\n---\n\n# {}\n",
            title, title, title, date, title
        )
    }

    fn post(title: &str, date: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\nexcerpt: Notes on {}\ntags: [life]\n---\nBody of {}\n",
            title, date, title, title
        )
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("hello-world"));
        assert!(is_valid_slug("v1.2_notes"));
        assert!(is_valid_slug("第一篇"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug(".hidden"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("a\\b"));
        assert!(!is_valid_slug("has space"));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let reader = ContentReader::new(tmp.path());

        assert!(reader.list_slugs(Category::Journey).unwrap().is_empty());
        assert!(reader.list_metadata::<Journey>().unwrap().is_empty());
    }

    #[test]
    fn test_list_slugs_filters_and_dedups() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/b.mdx", &project("B", "2024-06-01"));
        write(tmp.path(), "projects/a.mdx", &project("A", "2024-01-01"));
        write(tmp.path(), "projects/a.md", &project("A old", "2023-01-01"));
        write(tmp.path(), "projects/notes.txt", "not content");
        write(tmp.path(), "projects/.draft.mdx", &project("Hidden", "2024-01-01"));
        write(tmp.path(), "projects/nested/c.mdx", &project("C", "2024-01-01"));

        let reader = ContentReader::new(tmp.path());
        assert_eq!(reader.list_slugs(Category::Projects).unwrap(), vec!["a", "b"]);

        // .mdx wins over .md for the same stem
        let a = reader.get_by_slug::<Projects>("a").unwrap();
        assert_eq!(a.front_matter.title, "A");
    }

    #[test]
    fn test_list_metadata_newest_first() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/a.mdx", &project("A", "2024-01-01"));
        write(tmp.path(), "projects/b.mdx", &project("B", "2024-06-01"));

        let reader = ContentReader::new(tmp.path());
        let items = reader.list_metadata::<Projects>().unwrap();
        let slugs: Vec<_> = items.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn test_equal_dates_keep_slug_order() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journey/zeta.mdx", &post("Zeta", "2024-02-02"));
        write(tmp.path(), "journey/alpha.mdx", &post("Alpha", "2024-02-02"));
        write(tmp.path(), "journey/mid.mdx", &post("Mid", "2024-03-03"));

        let reader = ContentReader::new(tmp.path());
        let items = reader.list_metadata::<Journey>().unwrap();
        let slugs: Vec<_> = items.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_get_by_slug_returns_body() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journey/first.mdx", &post("First", "2024-01-15"));

        let reader = ContentReader::new(tmp.path());
        let item = reader.get_by_slug::<Journey>("first").unwrap();
        assert_eq!(item.slug, "first");
        assert_eq!(item.front_matter.excerpt, "Notes on First");
        assert_eq!(item.front_matter.tags, vec!["life"]);
        assert_eq!(item.body, "Body of First\n");
    }

    #[test]
    fn test_get_by_slug_not_found() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/a.mdx", &project("A", "2024-01-01"));
        write(tmp.path(), "secret.mdx", &project("Secret", "2024-01-01"));

        let reader = ContentReader::new(tmp.path());
        for slug in ["does-not-exist", "../secret", "", "a.mdx"] {
            let err = reader.get_by_slug::<Projects>(slug).unwrap_err();
            assert!(err.is_not_found(), "{:?} should be not found", slug);
        }
    }

    #[test]
    fn test_categories_are_separate() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/shared.mdx", &project("Shared", "2024-01-01"));

        let reader = ContentReader::new(tmp.path());
        assert!(reader.get_by_slug::<Projects>("shared").is_ok());
        assert!(reader.get_by_slug::<Journey>("shared").unwrap_err().is_not_found());
    }

    #[test]
    fn test_malformed_header_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journey/good.mdx", &post("Good", "2024-01-01"));
        write(
            tmp.path(),
            "journey/bad-date.mdx",
            "---\ntitle: Bad\ndate: someday\nexcerpt: x\n---\n",
        );

        let reader = ContentReader::new(tmp.path());
        let err = reader.get_by_slug::<Journey>("bad-date").unwrap_err();
        assert!(err.is_parse());

        // A single bad file fails the whole listing
        assert!(reader.list_metadata::<Journey>().unwrap_err().is_parse());
        // while the slug listing is unaffected
        assert_eq!(reader.list_slugs(Category::Journey).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_frontmatter_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journey/plain.md", "# No header\n");

        let reader = ContentReader::new(tmp.path());
        let err = reader.get_by_slug::<Journey>("plain").unwrap_err();
        assert!(matches!(
            err,
            ContentError::Parse {
                source: FrontMatterError::Missing,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_extensions() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "journey/one.markdown", &post("One", "2024-01-01"));
        write(tmp.path(), "journey/two.mdx", &post("Two", "2024-01-01"));

        let reader = ContentReader::new(tmp.path()).with_extensions([".markdown"]);
        assert_eq!(reader.list_slugs(Category::Journey).unwrap(), vec!["one"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/real.mdx", &project("Real", "2024-01-01"));
        std::os::unix::fs::symlink(
            tmp.path().join("nowhere.mdx"),
            tmp.path().join("projects/ghost.mdx"),
        )
        .unwrap();

        let reader = ContentReader::new(tmp.path());
        assert_eq!(reader.list_slugs(Category::Projects).unwrap(), vec!["real"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_category_is_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "projects/a.mdx", &project("A", "2024-01-01"));
        let dir = tmp.path().join("projects");
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root
        if fs::read_dir(&dir).is_ok() {
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let reader = ContentReader::new(tmp.path());
        let slugs = reader.list_slugs(Category::Projects);
        let metadata = reader.list_metadata::<Projects>();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(slugs, Err(ContentError::Io { ref path, .. }) if *path == dir));
        assert!(matches!(metadata, Err(ContentError::Io { .. })));
    }

    /// First line is a JSON header, the rest is body
    struct JsonLineParser;

    impl FrontMatterParser for JsonLineParser {
        fn parse<'a>(&self, raw: &'a str) -> std::result::Result<Document<'a>, FrontMatterError> {
            let (header, body) = raw.split_once('\n').unwrap_or((raw, ""));
            Ok(Document {
                header: serde_json::from_str(header)?,
                body,
            })
        }
    }

    #[test]
    fn test_custom_parser() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "journey/json.md",
            "{\"title\": \"Json\", \"date\": \"2024-02-02\", \"excerpt\": \"E\"}\nBody",
        );

        let reader = ContentReader::new(tmp.path()).with_parser(JsonLineParser);
        let item = reader.get_by_slug::<Journey>("json").unwrap();
        assert_eq!(item.front_matter.title, "Json");
        assert_eq!(item.body, "Body");
    }

    #[test]
    fn test_listing_sees_new_files() {
        let tmp = TempDir::new().unwrap();
        let reader = ContentReader::new(tmp.path());
        assert!(reader.list_slugs(Category::Projects).unwrap().is_empty());

        write(tmp.path(), "projects/late.mdx", &project("Late", "2024-01-01"));
        assert_eq!(reader.list_slugs(Category::Projects).unwrap(), vec!["late"]);
    }
}
