//! Article and listing models

use serde::{Deserialize, Serialize};

use crate::richtext::RichTextBlock;

/// An article as shown in the home page listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleSummary {
    /// Unique identifier (the document uid)
    pub id: String,

    /// First publication date as received from the API
    pub published_at: Option<String>,

    /// Article title
    pub title: String,

    /// Article subtitle
    pub subtitle: String,

    /// Author name
    pub author: String,
}

/// One page of a listing, or several pages accumulated together
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaginatedListing {
    /// Articles in fetch order
    pub items: Vec<ArticleSummary>,

    /// Token naming the next page; absent on the last page
    pub next_page_token: Option<String>,
}

impl PaginatedListing {
    /// Create a listing from its parts
    pub fn new(items: Vec<ArticleSummary>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token,
        }
    }

    /// Whether another page can be fetched
    pub fn has_more(&self) -> bool {
        self.next_token().is_some()
    }

    /// The next page token, treating an empty token as absent
    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A full article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleBody {
    /// Document uid
    pub id: String,
    pub title: String,
    pub banner_url: String,
    pub author: String,

    /// Sections in rendering order
    pub sections: Vec<Section>,

    /// First publication date as received from the API
    pub first_published: String,

    /// Last publication date as received from the API
    pub last_published: Option<String>,
}

impl ArticleBody {
    /// Whether the article was republished after its first publication
    pub fn is_edited(&self) -> bool {
        is_edited(&self.first_published, self.last_published.as_deref())
    }
}

/// A headed section of an article
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub heading: String,

    /// Plain text of each body block
    pub text_blocks: Vec<String>,

    /// Structured body blocks, used for rendering
    #[serde(default)]
    pub rich_text: Vec<RichTextBlock>,
}

impl Section {
    /// Build a section from structured blocks, keeping their plain text
    pub fn from_blocks(heading: String, blocks: Vec<RichTextBlock>) -> Self {
        let text_blocks = blocks.iter().map(|b| b.text.clone()).collect();
        Self {
            heading,
            text_blocks,
            rich_text: blocks,
        }
    }

    /// Build a section from plain text blocks
    pub fn plain(heading: &str, text_blocks: &[&str]) -> Self {
        let blocks = text_blocks
            .iter()
            .map(|t| RichTextBlock::paragraph(*t))
            .collect();
        Self::from_blocks(heading.to_string(), blocks)
    }
}

/// Whether an article counts as edited
///
/// Dates are compared exactly as received, without parsing or time-zone
/// normalization.
pub fn is_edited(first_published: &str, last_published: Option<&str>) -> bool {
    matches!(last_published, Some(last) if last != first_published)
}
