//! Home page listing that grows one page at a time

use crate::client::{ContentSource, FetchError};
use crate::content::{ArticleSummary, PaginatedListing};

/// Fetch the next page and append it to `current`
///
/// Items are concatenated as fetched, existing items first, without
/// de-duplication. The returned token is the fetched page's token. One fetch
/// per call and no retry; on error `current` is left as it was.
pub async fn load_more<S>(source: &S, current: &PaginatedListing) -> Result<PaginatedListing, FetchError>
where
    S: ContentSource + ?Sized,
{
    let token = current.next_token().ok_or(FetchError::NoMorePages)?;
    let page = source.get_page(token).await?;

    let mut items = Vec::with_capacity(current.items.len() + page.items.len());
    items.extend_from_slice(&current.items);
    items.extend(page.items);

    tracing::debug!(
        "Loaded {} more posts ({} total)",
        items.len() - current.items.len(),
        items.len()
    );

    Ok(PaginatedListing::new(items, page.next_page_token))
}

/// The accumulated listing of one page view
#[derive(Debug, Clone, Default)]
pub struct ListingState {
    listing: PaginatedListing,
}

impl ListingState {
    /// Start from the first page
    pub fn new(first_page: PaginatedListing) -> Self {
        Self {
            listing: first_page,
        }
    }

    pub fn posts(&self) -> &[ArticleSummary] {
        &self.listing.items
    }

    /// Whether the "load more" control should be offered
    pub fn has_more(&self) -> bool {
        self.listing.has_more()
    }

    /// Append the next page; the state only changes if the fetch succeeds
    pub async fn load_more<S>(&mut self, source: &S) -> Result<(), FetchError>
    where
        S: ContentSource + ?Sized,
    {
        self.listing = load_more(source, &self.listing).await?;
        Ok(())
    }

    pub fn into_listing(self) -> PaginatedListing {
        self.listing
    }
}
