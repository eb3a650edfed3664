//! In-memory content source
//!
//! Serves pre-split pages and articles without any network access. Page
//! tokens are `page-<n>`, counting from 1.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ContentSource, FetchError};
use crate::content::{ArticleBody, ArticleSummary, PaginatedListing};

#[derive(Debug, Default)]
pub struct MemorySource {
    pages: Vec<Vec<ArticleSummary>>,
    articles: HashMap<String, ArticleBody>,
    failing_pages: HashSet<usize>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page of listing items
    pub fn with_page(mut self, items: Vec<ArticleSummary>) -> Self {
        self.pages.push(items);
        self
    }

    /// Register an article, keyed by its id
    pub fn with_article(mut self, article: ArticleBody) -> Self {
        self.articles.insert(article.id.clone(), article);
        self
    }

    /// Make fetching page `number` (1-based) fail
    pub fn with_failing_page(mut self, number: usize) -> Self {
        self.failing_pages.insert(number);
        self
    }

    /// Number of fetches served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn page(&self, number: usize) -> Result<PaginatedListing, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if self.failing_pages.contains(&number) {
            return Err(FetchError::Status {
                status: 503,
                url: format!("page-{}", number),
            });
        }

        let items = match number.checked_sub(1).and_then(|i| self.pages.get(i)) {
            Some(items) => items.clone(),
            None if number == 1 => Vec::new(),
            None => return Err(FetchError::InvalidUrl(format!("page-{}", number))),
        };
        let next = (number < self.pages.len()).then(|| format!("page-{}", number + 1));

        Ok(PaginatedListing::new(items, next))
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn get_by_type(
        &self,
        _doc_type: &str,
        _page_size: usize,
    ) -> Result<PaginatedListing, FetchError> {
        self.page(1)
    }

    async fn get_page(&self, token: &str) -> Result<PaginatedListing, FetchError> {
        let number = token
            .strip_prefix("page-")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| FetchError::InvalidUrl(token.to_string()))?;
        self.page(number)
    }

    async fn get_by_uid(
        &self,
        _doc_type: &str,
        uid: &str,
    ) -> Result<Option<ArticleBody>, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.get(uid).cloned())
    }
}
