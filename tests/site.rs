use std::fs;
use std::path::Path;

use folio::content::{Category, Journey, Projects};
use folio::resolver::Resolution;
use folio::Folio;
use tempfile::TempDir;

fn write(base: &Path, rel: &str, content: &str) {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(title: &str, date: &str) -> String {
    format!(
        "---\ntitle: {title}\ndescription: About {title}\ntech: [Rust]\npreviewImage: /images/{title}.png\ndate: {date}\n---\n\n# {title}\n"
    )
}

fn portfolio() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path();
    write(
        base,
        "_config.yml",
        "title: Kris\nauthor: Kris\nurl: https://kris.example.com\ncontact:\n  email: kris@example.com\n",
    );
    write(base, "content/projects/a.mdx", &project("a", "2024-01-01"));
    write(base, "content/projects/b.mdx", &project("b", "2024-06-01"));
    write(
        base,
        "content/journey/week-one.md",
        "---\ntitle: Week One\ndate: 2024-01-08\nexcerpt: Setting up\ntags: [setup]\n---\nFirst week.\n",
    );
    write(base, "static/images/a.png", "png");
    tmp
}

#[test]
fn listing_is_newest_first() {
    let tmp = portfolio();
    let reader = Folio::new(tmp.path()).unwrap().reader();

    let slugs: Vec<_> = reader
        .list_metadata::<Projects>()
        .unwrap()
        .into_iter()
        .map(|m| m.slug)
        .collect();
    assert_eq!(slugs, vec!["b", "a"]);
}

#[test]
fn every_listed_slug_resolves() {
    let tmp = portfolio();
    let folio = Folio::new(tmp.path()).unwrap();
    let reader = folio.reader();

    for slug in reader.list_slugs(Category::Projects).unwrap() {
        let item = reader.get_by_slug::<Projects>(&slug).unwrap();
        assert_eq!(item.slug, slug);
    }

    let missing = folio.resolver().resolve::<Projects>("does-not-exist").unwrap();
    assert!(missing.is_not_found());
}

#[test]
fn missing_category_directory_is_empty() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "content/projects/a.mdx", &project("a", "2024-01-01"));
    let reader = Folio::new(tmp.path()).unwrap().reader();

    assert!(reader.list_slugs(Category::Journey).unwrap().is_empty());
    assert!(reader.list_metadata::<Journey>().unwrap().is_empty());
}

#[test]
fn repeated_reads_are_identical() {
    let tmp = portfolio();
    let reader = Folio::new(tmp.path()).unwrap().reader();

    let first = reader.list_metadata::<Journey>().unwrap();
    let second = reader.list_metadata::<Journey>().unwrap();
    assert_eq!(first, second);

    let first = reader.get_by_slug::<Projects>("a").unwrap();
    let second = reader.get_by_slug::<Projects>("a").unwrap();
    assert_eq!(first, second);

    let post = folio::resolver::PageResolver::new(reader)
        .resolve::<Journey>("week-one")
        .unwrap();
    match post {
        Resolution::Found(item) => assert_eq!(item.body, "First week.\n"),
        Resolution::NotFound { .. } => panic!("week-one should exist"),
    }
}

#[test]
fn generate_writes_the_site() {
    let tmp = portfolio();
    let folio = Folio::new(tmp.path()).unwrap();
    let summary = folio::commands::generate::build(&folio).unwrap();

    assert_eq!(summary.projects, 2);
    assert_eq!(summary.posts, 1);
    assert_eq!(summary.assets, 1);

    let public = tmp.path().join("public");
    for rel in [
        "index.html",
        "projects/a/index.html",
        "projects/b/index.html",
        "journey/week-one/index.html",
        "404.html",
        "projects/404.html",
        "journey/404.html",
        "sitemap.xml",
        "images/a.png",
    ] {
        assert!(public.join(rel).is_file(), "missing {}", rel);
    }

    let home = fs::read_to_string(public.join("index.html")).unwrap();
    let b = home.find(">b</a>").unwrap();
    let a = home.find(">a</a>").unwrap();
    assert!(b < a, "newer project should be listed first");
    assert!(home.contains("mailto:kris@example.com"));

    let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
    assert!(sitemap.contains("<loc>https://kris.example.com/journey/week-one</loc>"));
    assert!(sitemap.contains("<priority>0.6</priority>"));
}

#[test]
fn generate_drops_removed_items() {
    let tmp = portfolio();
    let folio = Folio::new(tmp.path()).unwrap();
    folio.generate().unwrap();

    fs::remove_file(tmp.path().join("content/projects/a.mdx")).unwrap();
    folio.generate().unwrap();

    let public = tmp.path().join("public");
    assert!(!public.join("projects/a").exists());
    assert!(public.join("projects/b/index.html").is_file());
}

#[test]
fn generate_without_sitemap() {
    let tmp = portfolio();
    write(tmp.path(), "_config.yml", "sitemap:\n  enable: false\n");
    let folio = Folio::new(tmp.path()).unwrap();
    folio.generate().unwrap();

    assert!(!tmp.path().join("public/sitemap.xml").exists());
}
