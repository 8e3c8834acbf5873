//! Error taxonomy for the digest pipeline.
//!
//! Each stage of a run has its own error type so that failures can be
//! recovered at the narrowest scope that keeps the process alive:
//!
//! | Error | Raised by | Recovered at |
//! |-------|-----------|--------------|
//! | [`ConfigError`] | startup | never (fatal) |
//! | [`FetchError`] | headline source | orchestrator (run aborted) |
//! | [`SummarizationError`] | summarizer backend | summarizer adapter (article skipped) |
//! | [`DeliveryError`] | mail gateway | orchestrator (run ends, no retry) |
//! | [`RunError`] | a single run | orchestrator `job()` |

use thiserror::Error;

/// Startup configuration failures. These are the only errors allowed to stop
/// the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NewsAPI key is missing: pass --newsapi-key or set the NEWSAPI environment variable")]
    MissingApiKey,

    #[error("failed to read config file {path}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid {field} address {value:?}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to initialise LLM summarizer: {0}")]
    Llm(String),
}

/// Headline provider failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("headline request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("headline provider rejected the request (HTTP {status}, {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid headline provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not decode headline response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Per-article summarization failures.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("could not decode summarizer response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("summarizer returned no summary")]
    EmptyResponse,

    #[error("article has no content to summarize")]
    EmptyInput,

    #[error("summarizer failed: {0}")]
    Service(String),

    #[error("summarizer panicked: {0}")]
    Internal(String),
}

impl SummarizationError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Network errors, 429 and 5xx responses are transient. Anything the
    /// service deliberately refused, or input we never sent, is not.
    pub fn is_transient(&self) -> bool {
        match self {
            SummarizationError::Http(_) | SummarizationError::Service(_) => true,
            SummarizationError::Rejected { status, .. } => *status == 429 || *status >= 500,
            SummarizationError::Decode(_)
            | SummarizationError::EmptyResponse
            | SummarizationError::EmptyInput
            | SummarizationError::Internal(_) => false,
        }
    }
}

/// Mail gateway failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to build digest email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("mail transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Anything that ends a single run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("run panicked: {0}")]
    Panicked(String),
}
