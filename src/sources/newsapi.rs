//! NewsAPI top-headlines client.
//!
//! Calls [`/v2/top-headlines`](https://newsapi.org/docs/endpoints/top-headlines)
//! with the configured category, language, and country. NewsAPI rejects
//! requests without a `User-Agent`, so the client always sends one.

use super::{HeadlineQuery, HeadlineSource};
use crate::error::FetchError;
use crate::models::{Article, TopHeadlinesResponse};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// NewsAPI client bound to one API key.
pub struct NewsApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl NewsApiClient {
    /// Build a client with its own connection pool and request timeout.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            api_key,
        })
    }

    fn endpoint(&self, query: &HeadlineQuery) -> Result<Url, FetchError> {
        let mut url = self.base_url.join("v2/top-headlines")?;
        url.query_pairs_mut()
            .append_pair("category", &query.category)
            .append_pair("language", &query.language)
            .append_pair("country", &query.country);
        Ok(url)
    }
}

impl std::fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl HeadlineSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(category = %query.category, language = %query.language, country = %query.country))]
    async fn fetch_top_headlines(&self, query: &HeadlineQuery) -> Result<Vec<Article>, FetchError> {
        let t0 = Instant::now();
        let url = self.endpoint(query)?;

        let resp = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(%status, body = %truncate_for_log(&body, 500), "NewsAPI response");

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<TopHeadlinesResponse>(&body) {
                Ok(parsed) => (
                    parsed.code.unwrap_or_else(|| "unknown".to_string()),
                    parsed.message.unwrap_or_default(),
                ),
                Err(_) => ("unknown".to_string(), truncate_for_log(&body, 300)),
            };
            warn!(status = status.as_u16(), %code, "NewsAPI rejected request");
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let parsed: TopHeadlinesResponse = serde_json::from_str(&body)?;
        if parsed.status != "ok" {
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                code: parsed.code.unwrap_or_else(|| parsed.status.clone()),
                message: parsed.message.unwrap_or_default(),
            });
        }

        let articles: Vec<Article> = parsed.articles.into_iter().map(Article::from).collect();
        info!(
            count = articles.len(),
            total_results = parsed.total_results.unwrap_or_default(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched top headlines"
        );
        Ok(articles)
    }
}
