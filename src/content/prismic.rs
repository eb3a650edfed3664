//! Wire types of the Prismic REST API and their conversion into models

use serde::{Deserialize, Deserializer, Serialize};

use super::{ArticleBody, ArticleSummary, PaginatedListing, Section};
use crate::richtext::RichTextBlock;

/// Repository information returned by the API root
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

impl ApiInfo {
    /// The ref of the published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// A content ref (a published or preview release)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<ApiDocument>,
}

impl SearchResponse {
    /// Convert into a listing of summaries
    ///
    /// Documents without a uid are left out: article pages are looked up by
    /// uid, so they could never be opened.
    pub fn into_listing(self) -> PaginatedListing {
        let items = self
            .results
            .into_iter()
            .filter(ApiDocument::has_uid)
            .map(ApiDocument::into_summary)
            .collect();
        PaginatedListing::new(items, self.next_page)
    }
}

/// A document as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDocument {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

/// Custom fields of a `post` document
///
/// Empty fields arrive as `null` and read as their default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub banner: Banner,
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<ContentGroup>,
}

/// Banner image field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One entry of the `content` group field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: Vec<RichTextBlock>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiDocument {
    pub fn has_uid(&self) -> bool {
        self.uid.as_deref().is_some_and(|uid| !uid.is_empty())
    }

    /// The identifier used in URLs: the uid, or the document id without one
    pub fn identifier(&self) -> String {
        self.uid.clone().unwrap_or_else(|| self.id.clone())
    }

    pub fn into_summary(self) -> ArticleSummary {
        ArticleSummary {
            id: self.identifier(),
            published_at: self.first_publication_date,
            title: self.data.title,
            subtitle: self.data.subtitle,
            author: self.data.author,
        }
    }

    pub fn into_article(self) -> ArticleBody {
        let id = self.identifier();
        let sections = self
            .data
            .content
            .into_iter()
            .map(|group| Section::from_blocks(group.heading, group.body))
            .collect();

        ArticleBody {
            id,
            title: self.data.title,
            banner_url: self.data.banner.url.unwrap_or_default(),
            author: self.data.author,
            sections,
            first_published: self.first_publication_date.unwrap_or_default(),
            last_published: self.last_publication_date,
        }
    }
}
