//! The digest job: fetch → clean → summarize → compose → deliver.
//!
//! [`Pipeline::run`] performs one end-to-end pass and reports what happened
//! through a `Result`. [`Pipeline::job`] is what the scheduler calls: it wraps
//! `run` with a start marker, panic containment, and outcome logging, and
//! never lets a failed run escape into the long-lived process.

use crate::delivery::Mailer;
use crate::digest::compose;
use crate::error::RunError;
use crate::models::{JobStatus, RunOutcome};
use crate::sources::{HeadlineQuery, HeadlineSource};
use crate::summarizer::{Summarize, SummarizerAdapter};
use crate::utils::{error_chain, panic_message};
use chrono::Local;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info, instrument};

/// One configured digest pipeline.
///
/// Holds no state between runs: every run fetches, summarizes, and renders
/// from scratch.
pub struct Pipeline<H, S, M> {
    source: H,
    summarizer: SummarizerAdapter<S>,
    mailer: M,
    query: HeadlineQuery,
    subject: String,
}

impl<H, S, M> Pipeline<H, S, M>
where
    H: HeadlineSource,
    S: Summarize,
    M: Mailer,
{
    pub fn new(
        source: H,
        summarizer: SummarizerAdapter<S>,
        mailer: M,
        query: HeadlineQuery,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            source,
            summarizer,
            mailer,
            query,
            subject: subject.into(),
        }
    }

    /// Run the pipeline once.
    ///
    /// Delivery is attempted only when at least one article was summarized.
    #[instrument(level = "info", skip_all, fields(category = %self.query.category))]
    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        info!("Fetching news articles");
        let articles = self.source.fetch_top_headlines(&self.query).await?;
        let fetched = articles.len();

        let summaries = self.summarizer.summarize_all(articles).await;
        if summaries.is_empty() {
            info!(fetched, "No articles summarized; skipping delivery");
            return Ok(RunOutcome::NothingToSend { fetched });
        }

        let digest = compose(&self.subject, &summaries);
        info!(articles = summaries.len(), "Sending digest email");
        self.mailer
            .send(&digest.plain, &digest.html, &self.subject)
            .await?;

        Ok(RunOutcome::Delivered {
            articles: summaries.len(),
        })
    }

    /// Run the pipeline once, containing every failure.
    ///
    /// Errors and panics are logged with their full diagnostic chain and
    /// reported as [`JobStatus::Failed`]; the caller keeps running.
    pub async fn job(&self) -> JobStatus {
        let started_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        info!(%started_at, "Running scheduled job");
        let t0 = Instant::now();

        let result = match AssertUnwindSafe(self.run()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(RunError::Panicked(panic_message(payload.as_ref()))),
        };
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                match outcome {
                    RunOutcome::Delivered { articles } => {
                        info!(articles, elapsed_ms, "Job complete: digest delivered");
                    }
                    RunOutcome::NothingToSend { fetched } => {
                        info!(fetched, elapsed_ms, "Job complete: no articles found to summarize");
                    }
                }
                JobStatus::Completed(outcome)
            }
            Err(e) => {
                error!(
                    error = %error_chain(&e),
                    elapsed_ms,
                    "Job failed; waiting for next scheduled run"
                );
                JobStatus::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, FetchError};
    use crate::models::Article;
    use crate::summarizer::testing::FakeSummarizer;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum SourceBehavior {
        Articles(Vec<Article>),
        Reject,
        Panic,
    }

    struct FakeSource {
        behavior: SourceBehavior,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(behavior: SourceBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HeadlineSource for FakeSource {
        async fn fetch_top_headlines(&self, _query: &HeadlineQuery) -> Result<Vec<Article>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                SourceBehavior::Articles(articles) => Ok(articles.clone()),
                SourceBehavior::Reject => Err(FetchError::Rejected {
                    status: 429,
                    code: "rateLimited".to_string(),
                    message: "slow down".to_string(),
                }),
                SourceBehavior::Panic => panic!("provider client blew up"),
            }
        }
    }

    /// Records sent digests; fails the first `failures` sends.
    #[derive(Default)]
    struct FakeMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        failures: AtomicUsize,
    }

    impl FakeMailer {
        fn failing(times: usize) -> Self {
            Self {
                failures: AtomicUsize::new(times),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Mailer for FakeMailer {
        async fn send(&self, plain: &str, html: &str, subject: &str) -> Result<(), DeliveryError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                let err = lettre::Message::builder().body(String::new()).unwrap_err();
                return Err(DeliveryError::Message(err));
            }
            self.sent
                .lock()
                .unwrap()
                .push((plain.to_string(), html.to_string(), subject.to_string()));
            Ok(())
        }
    }

    fn three_articles_second_fails() -> Vec<Article> {
        vec![
            Article::new("Fed holds rates", "Reuters", Some("<p>The Fed held rates.</p>")),
            Article::new("Broken story", "AP", Some("FAIL in the model")),
            Article::new("Oil slides", "Bloomberg", Some("Crude fell sharply. [+900 chars]")),
        ]
    }

    fn pipeline<'a>(
        source: &'a FakeSource,
        summarizer: &'a FakeSummarizer,
        mailer: &'a FakeMailer,
    ) -> Pipeline<&'a FakeSource, &'a FakeSummarizer, &'a FakeMailer> {
        Pipeline::new(
            source,
            SummarizerAdapter::new(summarizer),
            mailer,
            HeadlineQuery::default(),
            "Daily News Summary",
        )
    }

    #[tokio::test]
    async fn test_failed_article_is_skipped_and_numbering_compacts() {
        let source = FakeSource::new(SourceBehavior::Articles(three_articles_second_fails()));
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();

        let outcome = pipeline(&source, &summarizer, &mailer).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::Delivered { articles: 2 });
        assert_eq!(summarizer.call_count(), 3);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let (plain, html, subject) = &sent[0];
        assert_eq!(subject, "Daily News Summary");

        assert!(plain.contains("Article 1:\nTitle: Fed holds rates"));
        assert!(plain.contains("Article 2:\nTitle: Oil slides"));
        assert!(!plain.contains("Article 3"));
        assert!(!plain.contains("Broken story"));
        assert!(plain.find("Reuters").unwrap() < plain.find("Bloomberg").unwrap());

        assert!(html.contains("Article 1</h3>"));
        assert!(html.contains("Article 2</h3>"));
        assert!(!html.contains("Broken story"));
        assert!(html.contains("summary of Crude fell sharply."));
    }

    #[tokio::test]
    async fn test_no_articles_means_no_work() {
        let source = FakeSource::new(SourceBehavior::Articles(Vec::new()));
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();

        let status = pipeline(&source, &summarizer, &mailer).job().await;

        assert_eq!(status, JobStatus::Completed(RunOutcome::NothingToSend { fetched: 0 }));
        assert_eq!(summarizer.call_count(), 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_skip_delivery() {
        let source = FakeSource::new(SourceBehavior::Articles(vec![
            Article::new("a", "S", Some("FAIL")),
            Article::new("b", "S", None),
        ]));
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();

        let outcome = pipeline(&source, &summarizer, &mailer).run().await.unwrap();

        assert_eq!(outcome, RunOutcome::NothingToSend { fetched: 2 });
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_run_without_delivery() {
        let source = FakeSource::new(SourceBehavior::Reject);
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();
        let pipeline = pipeline(&source, &summarizer, &mailer);

        assert!(matches!(pipeline.run().await, Err(RunError::Fetch(_))));
        assert_eq!(pipeline.job().await, JobStatus::Failed);
        assert_eq!(summarizer.call_count(), 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_poison_next_run() {
        let source = FakeSource::new(SourceBehavior::Articles(three_articles_second_fails()));
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::failing(1);
        let pipeline = pipeline(&source, &summarizer, &mailer);

        assert_eq!(pipeline.job().await, JobStatus::Failed);
        assert!(mailer.sent().is_empty());

        assert_eq!(
            pipeline.job().await,
            JobStatus::Completed(RunOutcome::Delivered { articles: 2 })
        );
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_summarizer_panic_skips_only_that_article() {
        let source = FakeSource::new(SourceBehavior::Articles(vec![
            Article::new("Fed holds rates", "Reuters", Some("The Fed held rates.")),
            Article::new("Crash story", "AP", Some("PANIC in the model")),
            Article::new("Oil slides", "Bloomberg", Some("Crude fell sharply.")),
        ]));
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();

        let status = pipeline(&source, &summarizer, &mailer).job().await;

        assert_eq!(status, JobStatus::Completed(RunOutcome::Delivered { articles: 2 }));
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].0.contains("Article 2:\nTitle: Oil slides"));
        assert!(!sent[0].0.contains("Crash story"));
    }

    #[tokio::test]
    async fn test_panicking_run_is_contained() {
        let source = FakeSource::new(SourceBehavior::Panic);
        let summarizer = FakeSummarizer::default();
        let mailer = FakeMailer::default();
        let pipeline = pipeline(&source, &summarizer, &mailer);

        assert_eq!(pipeline.job().await, JobStatus::Failed);
        assert_eq!(pipeline.job().await, JobStatus::Failed);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
