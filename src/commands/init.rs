//! Initialize a new portfolio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: My Portfolio
author: John Doe
tagline: I build applications and document what I learn along the way.
description: Projects and notes from the build.

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public
static_dir: static

# Writing
extensions: [mdx, md]
date_format: "%B %-d, %Y"
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: true

sitemap:
  enable: true

contact:
  email:
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("content/projects"))?;
    fs::create_dir_all(target_dir.join("content/journey"))?;
    fs::create_dir_all(target_dir.join("static/images"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;

    let today = chrono::Local::now().format("%Y-%m-%d");

    let sample_project = format!(
        r#"---
title: Hello Portfolio
description: A first project to show how case studies are written.
tech: [Rust, Markdown]
previewImage: /images/hello-portfolio.png
date: {today}
---

## Overview

Describe the problem, the approach and the outcome here.

```rust
fn main() {{
    println!("Hello, portfolio!");
}}
```
"#
    );

    let sample_post = format!(
        r#"---
title: Starting the Journey
date: {today}
excerpt: Why this site exists and what will be written here.
tags: [meta]
---

Journey posts are short notes written while building projects.
"#
    );

    fs::write(
        target_dir.join("content/projects/hello-portfolio.mdx"),
        sample_project,
    )?;
    fs::write(
        target_dir.join("content/journey/starting-the-journey.mdx"),
        sample_post,
    )?;

    Ok(())
}
