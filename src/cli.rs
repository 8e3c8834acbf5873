//! Command-line interface definitions for News Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every flag is optional and overrides the matching field of the YAML config
//! file; secrets and delivery addresses can also come from environment
//! variables (or a `.env` file).

use crate::config::BackendKind;
use clap::Parser;

/// Command-line arguments for the News Digest application.
///
/// # Examples
///
/// ```sh
/// # Hourly digest with defaults (business / en / us, localhost:25)
/// NEWSAPI=xxxx news_digest --recipient me@example.com
///
/// # Settings from a file, one run, then exit
/// news_digest -c ./digest.yaml --once
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Headline category (business, technology, ...)
    #[arg(long)]
    pub category: Option<String>,

    /// Two-letter headline language
    #[arg(long)]
    pub language: Option<String>,

    /// Two-letter headline country
    #[arg(long)]
    pub country: Option<String>,

    /// Sender address of the digest email
    #[arg(long, env = "DIGEST_SENDER")]
    pub sender: Option<String>,

    /// Recipient address of the digest email
    #[arg(long, env = "DIGEST_RECIPIENT")]
    pub recipient: Option<String>,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    /// Seconds between scheduled runs
    #[arg(long)]
    pub period_secs: Option<u64>,

    /// Seconds between checks for due runs
    #[arg(long)]
    pub poll_secs: Option<u64>,

    /// Summarization backend
    #[arg(long, value_enum)]
    pub summarizer: Option<BackendKind>,

    /// Summarization model name
    #[arg(long)]
    pub model: Option<String>,

    /// Hugging Face API token
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Run a single digest job and exit instead of scheduling
    #[arg(long)]
    pub once: bool,
}
