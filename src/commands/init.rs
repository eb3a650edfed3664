//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new blog in the given directory
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("languages"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
        return Ok(());
    }

    let config_content = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: ''

# URL
url: http://localhost:3000
root: /

# Directory
public_dir: public

# Content source
## Repository API endpoint, e.g. https://your-repo.cdn.prismic.io/api/v2
api_endpoint: ''
## Leave empty to read PRISMIC_ACCESS_TOKEN from the environment
access_token: ''
document_type: post
page_size: 2
request_timeout_secs: 10

# Date / Time format
date_format: DD MMM YYYY

# Revalidation intervals (seconds)
revalidate:
  listing_secs: 60
  post_secs: 3600
"#;

    fs::write(config_path, config_content)?;

    Ok(())
}
