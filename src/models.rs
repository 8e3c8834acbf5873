//! Data models for fetched articles, their summaries, and the rendered digest.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A headline record as returned by the provider
//! - [`Summary`]: One successfully summarized article, with its compacted index
//! - [`SummaryOutcome`]: Per-article result of a summarization batch
//! - [`Digest`]: The plain-text and HTML bodies sent for one run
//! - [`RunOutcome`] / [`JobStatus`]: What a run or scheduled job ended with
//!
//! The provider wire types ([`TopHeadlinesResponse`] and friends) mirror the
//! NewsAPI JSON schema, hence the camelCase renames.

use serde::Deserialize;

/// A news article as returned by the headline provider.
///
/// Immutable after creation; consumed by the summarizer batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The article headline.
    pub title: String,
    /// Display name of the publishing outlet.
    pub source_name: String,
    /// Raw article content, possibly containing markup and a `[+N chars]` tail.
    pub content: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        source_name: impl Into<String>,
        content: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            source_name: source_name.into(),
            content: content.map(str::to_string),
        }
    }
}

/// A successfully summarized article.
///
/// `index` is zero-based and contiguous across the summaries of one run:
/// articles that failed summarization leave no gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub index: usize,
    pub title: String,
    pub source_name: String,
    pub text: String,
}

/// A summary before compaction assigns its display index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub source_name: String,
    pub text: String,
}

/// Result of summarizing a single article within a batch.
#[derive(Debug)]
pub enum SummaryOutcome {
    Summarized(Draft),
    Skipped {
        /// Zero-based position in fetch order.
        position: usize,
        title: String,
        reason: crate::error::SummarizationError,
    },
}

/// The rendered digest for one run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub plain: String,
    pub html: String,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A digest with this many articles was handed to the mail transport.
    Delivered { articles: usize },
    /// Nothing survived summarization, so no email was composed.
    NothingToSend { fetched: usize },
}

/// Contained result of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Completed(RunOutcome),
    Failed,
}

/// NewsAPI `top-headlines` response envelope.
///
/// Successful responses carry `articles`; errors carry `code` and `message`
/// with `status == "error"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHeadlinesResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single article record in the NewsAPI schema.
///
/// NewsAPI returns `null` for any of these fields on removed or partial
/// articles, so every field is optional on the wire.
#[derive(Debug, Deserialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub source: Option<ApiSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSource {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ApiArticle> for Article {
    fn from(api: ApiArticle) -> Self {
        Article {
            title: api.title.unwrap_or_default(),
            source_name: api.source.and_then(|s| s.name).unwrap_or_default(),
            content: api.content,
        }
    }
}
