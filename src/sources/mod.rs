//! Headline sources.
//!
//! A headline source performs one network call per run and returns the
//! provider's articles in the order the provider ranked them. No client-side
//! filtering or re-sorting happens here.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | NewsAPI | [`newsapi`] | `GET /v2/top-headlines` | Requires API key |

pub mod newsapi;

use crate::error::FetchError;
use crate::models::Article;

/// Category and locale of the headlines to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineQuery {
    pub category: String,
    pub language: String,
    pub country: String,
}

impl Default for HeadlineQuery {
    fn default() -> Self {
        Self {
            category: "business".to_string(),
            language: "en".to_string(),
            country: "us".to_string(),
        }
    }
}

/// Something that can produce a run's worth of articles.
pub trait HeadlineSource {
    /// Fetch the current top headlines for `query`.
    async fn fetch_top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>, FetchError>;
}

impl<T: HeadlineSource> HeadlineSource for &T {
    async fn fetch_top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>, FetchError> {
        (**self).fetch_top_headlines(query).await
    }
}
