//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::{GenerateSummary, Generator};
use crate::Folio;

/// Generate the static site
pub fn run(folio: &Folio) -> Result<()> {
    build(folio).map(|_| ())
}

/// Generate the static site and report what was written
pub fn build(folio: &Folio) -> Result<GenerateSummary> {
    let start = std::time::Instant::now();

    let generator = Generator::new(folio)?;
    let summary = generator.generate()?;

    tracing::info!(
        "Generated {} projects, {} journey posts and {} static files in {:.2}s",
        summary.projects,
        summary.posts,
        summary.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// Watch for file changes and regenerate
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    if folio.content_dir.exists() {
        watcher.watch(&folio.content_dir, notify::RecursiveMode::Recursive)?;
    }
    if folio.static_dir.exists() {
        watcher.watch(&folio.static_dir, notify::RecursiveMode::Recursive)?;
    }
    let config_path = folio.config_path();
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut folio = folio.clone();
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // Only rebuild if more than 500ms since last rebuild
                if last_rebuild.elapsed() <= Duration::from_millis(500) {
                    continue;
                }

                if event.paths.iter().any(|p| p == &config_path) {
                    match Folio::new(&folio.base_dir) {
                        Ok(reloaded) => folio = reloaded,
                        Err(e) => {
                            tracing::error!("Failed to reload config: {:#}", e);
                            continue;
                        }
                    }
                }

                tracing::info!("File changed, regenerating...");
                if let Err(e) = run(&folio) {
                    tracing::error!("Generation failed: {:#}", e);
                }
                last_rebuild = std::time::Instant::now();
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_fails_on_malformed_content() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("content/projects")).unwrap();
        fs::write(
            tmp.path().join("content/projects/broken.md"),
            "no front matter here",
        )
        .unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        assert!(build(&folio).is_err());
    }

    #[test]
    fn test_build_empty_site() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();

        let summary = build(&folio).unwrap();
        assert_eq!(summary, GenerateSummary::default());
        assert!(tmp.path().join("public/index.html").exists());
        assert!(tmp.path().join("public/404.html").exists());
    }
}
