//! Article summarization with per-article failure containment.
//!
//! This module wraps an external summarization service behind a small trait
//! and turns a batch of fetched articles into an ordered, compacted list of
//! summaries.
//!
//! # Architecture
//!
//! - [`Summarize`]: Core trait: text plus length bounds in, summary out
//! - [`Retrying`]: Decorator that adds bounded backoff for transient failures
//! - [`Backend`]: The configured concrete service ([`huggingface`], or [`llm`]
//!   with the `llm` feature)
//! - [`SummarizerAdapter`]: Cleans, truncates, and summarizes each article,
//!   skipping the ones that fail
//!
//! # Batch Semantics
//!
//! Each article is summarized on its own. A failure is logged with the
//! article's position and title, recorded as [`SummaryOutcome::Skipped`], and
//! the batch moves on. [`compact`] then drops skipped entries and numbers the
//! survivors `0..n` in fetch order.

pub mod huggingface;
#[cfg(feature = "llm")]
pub mod llm;

use crate::cleaner::clean;
use crate::error::SummarizationError;
use crate::models::{Article, Draft, Summary, SummaryOutcome};
use crate::utils::{panic_message, truncate_chars};
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Maximum characters of cleaned text sent to the summarizer.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 400;
/// Lower bound on summary length, in model tokens.
pub const DEFAULT_MIN_LENGTH: usize = 30;
/// Upper bound on summary length, in model tokens.
pub const DEFAULT_MAX_LENGTH: usize = 80;
/// Chat template the LLM backend loads when none is configured.
pub const DEFAULT_LLM_TEMPLATE: &str = "news_summarizer";

/// Trait for async text summarization.
///
/// Implementors send `text` to some model and return a single best summary
/// whose length falls within `min_len..=max_len` model tokens. Decoding is
/// expected to be deterministic.
pub trait Summarize {
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError>;
}

impl<T: Summarize> Summarize for &T {
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError> {
        (**self).summarize(text, min_len, max_len).await
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Summarize`]
/// implementation.
///
/// Only errors that [`SummarizationError::is_transient`] accepts are retried;
/// a rejected or empty request fails straight away.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct Retrying<T> {
    /// The wrapped summarizer
    inner: T,
    /// Maximum number of retry attempts after the first call
    max_retries: usize,
    /// Delay before the first retry; doubled on each later attempt
    base_delay: Duration,
    /// Upper bound on the backoff delay, before jitter
    max_delay: Duration,
}

impl<T> Retrying<T>
where
    T: Summarize,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for Retrying<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Summarize for Retrying<T>
where
    T: Summarize,
{
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.summarize(text, min_len, max_len).await {
                Ok(summary) => return Ok(summary),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "summarize() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "summarize() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The summarization service selected at startup.
pub enum Backend {
    HuggingFace(huggingface::HuggingFaceSummarizer),
    #[cfg(feature = "llm")]
    Llm(llm::LlmSummarizer),
}

impl Summarize for Backend {
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError> {
        match self {
            Backend::HuggingFace(hf) => hf.summarize(text, min_len, max_len).await,
            #[cfg(feature = "llm")]
            Backend::Llm(llm) => llm.summarize(text, min_len, max_len).await,
        }
    }
}

/// Batch summarizer: cleaning, input truncation, fixed length bounds, and
/// skip-on-failure around a [`Summarize`] service.
pub struct SummarizerAdapter<S> {
    inner: S,
    max_input_chars: usize,
    min_length: usize,
    max_length: usize,
}

impl<S: Summarize> SummarizerAdapter<S> {
    /// Wrap `inner` with the default bounds (400 input chars, 30..=80 output).
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    pub fn with_bounds(mut self, max_input_chars: usize, min_length: usize, max_length: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// Summarize one piece of text under this adapter's truncation and bounds.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let input = truncate_chars(text, self.max_input_chars);
        if input.trim().is_empty() {
            return Err(SummarizationError::EmptyInput);
        }
        let summary = self
            .inner
            .summarize(input, self.min_length, self.max_length)
            .await?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SummarizationError::EmptyResponse);
        }
        Ok(summary.to_string())
    }

    /// Summarize every article in fetch order, returning one outcome each.
    ///
    /// Articles are processed sequentially; a failure never stops the batch.
    pub async fn outcomes(&self, articles: Vec<Article>) -> Vec<SummaryOutcome> {
        stream::iter(articles.into_iter().enumerate())
            .then(|(position, article)| self.summarize_article(position, article))
            .collect()
            .await
    }

    /// Summarize a batch and compact the survivors into display order.
    #[instrument(level = "info", skip_all, fields(articles = articles.len()))]
    pub async fn summarize_all(&self, articles: Vec<Article>) -> Vec<Summary> {
        let total = articles.len();
        let outcomes = self.outcomes(articles).await;
        let skipped: Vec<String> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                SummaryOutcome::Skipped { position, title, .. } => Some(format!("#{position} {title}")),
                SummaryOutcome::Summarized(_) => None,
            })
            .collect();
        let summaries = compact(outcomes);
        info!(
            total,
            summarized = summaries.len(),
            skipped = ?skipped,
            "Summarization batch complete"
        );
        summaries
    }

    async fn summarize_article(&self, position: usize, article: Article) -> SummaryOutcome {
        let text = clean(article.content.as_deref());
        let t0 = Instant::now();

        let result = match AssertUnwindSafe(self.summarize(&text)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(SummarizationError::Internal(panic_message(payload.as_ref()))),
        };

        match result {
            Ok(summary) => {
                info!(
                    position,
                    title = %article.title,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Summarized article"
                );
                SummaryOutcome::Summarized(Draft {
                    title: article.title,
                    source_name: article.source_name,
                    text: summary,
                })
            }
            Err(reason) => {
                warn!(
                    position,
                    title = %article.title,
                    error = %reason,
                    "Failed to summarize article; skipping"
                );
                SummaryOutcome::Skipped {
                    position,
                    title: article.title,
                    reason,
                }
            }
        }
    }
}

/// Drop skipped outcomes and number the rest contiguously from zero.
pub fn compact(outcomes: Vec<SummaryOutcome>) -> Vec<Summary> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            SummaryOutcome::Summarized(draft) => Some(draft),
            SummaryOutcome::Skipped { .. } => None,
        })
        .enumerate()
        .map(|(index, draft)| Summary {
            index,
            title: draft.title,
            source_name: draft.source_name,
            text: draft.text,
        })
        .collect()
}
