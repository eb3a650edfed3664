//! Content source clients
//!
//! The generator, the server and the commands never talk to the API
//! directly. They receive something implementing [`ContentSource`],
//! normally a [`PrismicClient`] built from a [`crate::config::ClientConfig`].

mod memory;
mod prismic;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{ArticleBody, ArticleSummary, PaginatedListing};

pub use memory::MemorySource;
pub use prismic::PrismicClient;

/// Errors raised while fetching content
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("repository has no master ref")]
    MissingRef,

    #[error("listing has no further pages")]
    NoMorePages,

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// A paginated, typed source of blog content
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of a type
    async fn get_by_type(
        &self,
        doc_type: &str,
        page_size: usize,
    ) -> Result<PaginatedListing, FetchError>;

    /// The page named by a listing's next page token
    async fn get_page(&self, token: &str) -> Result<PaginatedListing, FetchError>;

    /// A single document by uid, `None` when it does not exist
    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<ArticleBody>, FetchError>;

    /// Every document of a type, following all pages
    async fn get_all_by_type(
        &self,
        doc_type: &str,
        page_size: usize,
    ) -> Result<Vec<ArticleSummary>, FetchError> {
        let mut listing = self.get_by_type(doc_type, page_size).await?;
        let mut all = std::mem::take(&mut listing.items);

        while let Some(token) = listing.next_token().map(str::to_string) {
            listing = self.get_page(&token).await?;
            all.append(&mut listing.items);
        }

        Ok(all)
    }
}
