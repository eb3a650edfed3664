//! Configuration module

mod client;
mod site;

pub use client::{ClientConfig, PreviewData, RequestContext, PREVIEW_COOKIE};
pub use site::{RevalidateConfig, SiteConfig, ACCESS_TOKEN_ENV};
