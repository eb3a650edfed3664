//! Prismic REST API client

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{ContentSource, FetchError};
use crate::config::ClientConfig;
use crate::content::prismic::{ApiInfo, SearchResponse};
use crate::content::{ArticleBody, PaginatedListing};

/// HTTP client for a Prismic repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PrismicClient {
    /// Create a client from explicit configuration
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    fn parse_url(&self, raw: &str) -> Result<Url, FetchError> {
        Url::parse(raw).map_err(|_| FetchError::InvalidUrl(raw.to_string()))
    }

    /// Add the access token unless the URL already carries one
    fn authorize(&self, url: &mut Url) {
        if let Some(token) = &self.config.access_token {
            if !url.query_pairs().any(|(key, _)| key == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
    }

    /// The ref to query: a preview ref, or the repository's master ref
    async fn content_ref(&self) -> Result<String, FetchError> {
        if let Some(preview) = self.config.preview_ref() {
            tracing::debug!("Using preview ref");
            return Ok(preview);
        }

        let url = self.parse_url(self.endpoint())?;
        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or(FetchError::MissingRef)
    }

    /// Run a predicate query against the documents search endpoint
    async fn search(&self, query: &str, page_size: usize) -> Result<SearchResponse, FetchError> {
        let reference = self.content_ref().await?;
        let mut url = self.parse_url(&format!("{}/documents/search", self.endpoint()))?;
        url.query_pairs_mut()
            .append_pair("ref", &reference)
            .append_pair("q", query)
            .append_pair("pageSize", &page_size.to_string());
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, mut url: Url) -> Result<T, FetchError> {
        self.authorize(&mut url);
        tracing::debug!("GET {}", url.path());

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            url.set_query(None);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn get_by_type(
        &self,
        doc_type: &str,
        page_size: usize,
    ) -> Result<PaginatedListing, FetchError> {
        let query = format!("[[at(document.type,\"{}\")]]", doc_type);
        let response = self.search(&query, page_size).await?;
        tracing::debug!(
            "Fetched page {} of {} for type {}",
            response.page,
            response.total_pages,
            doc_type
        );
        Ok(response.into_listing())
    }

    async fn get_page(&self, token: &str) -> Result<PaginatedListing, FetchError> {
        let url = self.parse_url(token)?;
        let endpoint = self.parse_url(self.endpoint())?;
        if url.origin() != endpoint.origin() {
            return Err(FetchError::InvalidUrl(token.to_string()));
        }
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.into_listing())
    }

    async fn get_by_uid(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<ArticleBody>, FetchError> {
        if uid.is_empty() || uid.contains(['"', '\\']) {
            return Ok(None);
        }

        let query = format!("[[at(my.{}.uid,\"{}\")]]", doc_type, uid);
        let response = self.search(&query, 1).await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|document| document.into_article()))
    }
}
