//! Content module - article models, API wire types and reading time

mod article;
pub mod prismic;
pub mod reading;

pub use article::{is_edited, ArticleBody, ArticleSummary, PaginatedListing, Section};
pub use reading::{estimate_reading_minutes, reading_minutes, RenderState};
