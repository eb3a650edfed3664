//! spacetraveling: a static blog generator backed by a Prismic repository
//!
//! Articles are fetched from a headless content API, rendered with embedded
//! Tera templates and written to a public directory. The development server
//! regenerates pages in the background as they go stale.

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod richtext;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use client::{FetchError, PrismicClient};
use config::ClientConfig;

/// The blog application: configuration and directories
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Directory of language override files
    pub languages_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog instance from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let languages_dir = base_dir.join("languages");

        Self {
            config,
            base_dir,
            public_dir,
            languages_dir,
        }
    }

    /// Content source client configuration for this site
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from_site(&self.config)
    }

    /// Build a content source client for this site
    pub fn client(&self) -> Result<PrismicClient> {
        if self.config.api_endpoint.is_empty() {
            anyhow::bail!("api_endpoint is not set in _config.yml");
        }
        let client = PrismicClient::new(self.client_config()).map_err(|e: FetchError| {
            anyhow::anyhow!("Failed to create content client: {}", e)
        })?;
        Ok(client)
    }

    /// Language strings for this site
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(&self.languages_dir)?;
        Ok(i18n)
    }
}
