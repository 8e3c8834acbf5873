//! # News Digest
//!
//! An hourly news digest mailer. Each run fetches the top business headlines
//! from NewsAPI, summarizes every article with a hosted summarization model,
//! and emails the collected summaries as a plain-text + HTML digest through a
//! local SMTP relay.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI=xxxx news_digest --recipient me@example.com
//! ```
//!
//! ## Architecture
//!
//! The application is a single linear pipeline, re-run on a fixed period:
//! 1. **Fetching**: Pull top headlines for one category and locale
//! 2. **Cleaning**: Strip markup and provider truncation markers
//! 3. **Summarizing**: Summarize each article; failures are skipped
//! 4. **Composing**: Render the digest as plain text and HTML
//! 5. **Delivering**: Send one multipart email
//!
//! A failed run is logged and the process waits for the next one. Only
//! configuration errors at startup stop the process.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cleaner;
mod cli;
mod config;
mod delivery;
mod digest;
mod error;
mod models;
mod pipeline;
mod scheduler;
mod sources;
mod summarizer;
mod utils;

use cli::Cli;
use config::{AppConfig, BackendKind};
use delivery::SmtpMailer;
use error::ConfigError;
use pipeline::Pipeline;
use scheduler::Scheduler;
use sources::newsapi::NewsApiClient;
use summarizer::huggingface::HuggingFaceSummarizer;
use summarizer::{Backend, Retrying, SummarizerAdapter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "news_digest starting up");

    let args = Cli::parse();
    let config = match AppConfig::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %utils::error_chain(&e), "Invalid configuration");
            return Err(e.into());
        }
    };

    let source = NewsApiClient::new(&config.newsapi_base_url, config.api_key.clone(), config.http_timeout)?;
    let backend = build_backend(&config).await?;
    let s = &config.summarizer;
    let summarizer = SummarizerAdapter::new(Retrying::new(
        backend,
        s.max_retries,
        Duration::from_millis(s.retry_base_ms),
    ))
    .with_bounds(s.max_input_chars, s.min_length, s.max_length);
    let mailer = SmtpMailer::new(
        &config.smtp_host,
        config.smtp_port,
        config.smtp_timeout,
        config.from.clone(),
        config.to.clone(),
    );
    let pipeline = Pipeline::new(source, summarizer, mailer, config.query.clone(), config.subject.clone());

    if args.once {
        let status = pipeline.job().await;
        info!(?status, "Single run finished");
        return Ok(());
    }

    let pipeline = &pipeline;
    Scheduler::new(config.period, config.poll)
        .run_until(move || pipeline.job(), shutdown_signal())
        .await;

    info!("news_digest stopped");
    Ok(())
}

/// Construct the configured summarization backend.
#[instrument(level = "info", skip_all, fields(backend = ?config.summarizer.backend))]
async fn build_backend(config: &AppConfig) -> Result<Backend, ConfigError> {
    let s = &config.summarizer;
    match s.backend {
        BackendKind::HuggingFace => {
            let hf = HuggingFaceSummarizer::new(
                &s.endpoint,
                &s.model,
                s.api_token.clone(),
                Duration::from_secs(s.timeout_secs),
            )?;
            info!(model = %s.model, endpoint = %s.endpoint, "Using Hugging Face summarizer");
            Ok(Backend::HuggingFace(hf))
        }
        #[cfg(feature = "llm")]
        BackendKind::Llm => {
            let llm = summarizer::llm::LlmSummarizer::load(s.llm_config.as_deref(), &s.template).await?;
            Ok(Backend::Llm(llm))
        }
        #[cfg(not(feature = "llm"))]
        BackendKind::Llm => Err(ConfigError::Llm(
            "this binary was built without the `llm` feature".to_string(),
        )),
    }
}

/// Resolves on Ctrl+C; the process has no other stop mechanism.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
}
