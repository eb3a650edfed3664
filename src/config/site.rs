//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable consulted when the config has no access token
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Content source
    pub api_endpoint: String,
    pub access_token: String,
    pub document_type: String,
    pub page_size: usize,
    pub request_timeout_secs: u64,

    // Date format for listing and article pages
    pub date_format: String,

    #[serde(default)]
    pub revalidate: RevalidateConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            api_endpoint: String::new(),
            access_token: String::new(),
            document_type: "post".to_string(),
            page_size: 2,
            request_timeout_secs: 10,

            date_format: "DD MMM YYYY".to_string(),

            revalidate: RevalidateConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// The access token, falling back to the environment
    pub fn resolve_access_token(&self) -> Option<String> {
        self.resolve_access_token_with(std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    fn resolve_access_token_with(&self, from_env: Option<String>) -> Option<String> {
        if !self.access_token.is_empty() {
            return Some(self.access_token.clone());
        }
        from_env.filter(|t| !t.is_empty())
    }

    /// The configured time zone, if it names a known zone
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        if self.timezone.is_empty() {
            return None;
        }
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                None
            }
        }
    }
}

/// Revalidation intervals for generated pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    /// Home page listing
    pub listing_secs: u64,
    /// Individual article pages
    pub post_secs: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            listing_secs: 60,
            post_secs: 60 * 60,
        }
    }
}
