//! Runtime configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults (business / en / us, localhost:25, hourly)
//! 2. An optional YAML file passed with `--config`
//! 3. Command-line flags and their environment variables
//!
//! [`AppConfig::resolve`] merges the layers and validates the result, so a
//! missing API key or a malformed address fails at startup with a
//! [`ConfigError`] instead of surfacing later as an opaque run failure.
//!
//! # Example file
//!
//! ```yaml
//! category: technology
//! recipient: me@example.com
//! period_secs: 1800
//! summarizer:
//!   model: facebook/bart-large-cnn
//!   max_retries: 3
//! ```

use crate::cli::Cli;
use crate::delivery::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::digest::DEFAULT_TITLE;
use crate::error::ConfigError;
use crate::sources::HeadlineQuery;
use crate::sources::newsapi::DEFAULT_BASE_URL;
use crate::summarizer::{
    DEFAULT_LLM_TEMPLATE, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, huggingface,
};
use lettre::message::Mailbox;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

/// Which summarization service to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
pub enum BackendKind {
    /// Hugging Face Inference API
    #[default]
    #[serde(rename = "huggingface")]
    #[value(name = "huggingface")]
    HuggingFace,
    /// OpenAI-compatible LLM via awful_aj (requires the `llm` feature)
    #[serde(rename = "llm")]
    #[value(name = "llm")]
    Llm,
}

/// Summarizer section of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerSettings {
    pub backend: BackendKind,
    pub endpoint: String,
    pub model: String,
    pub api_token: Option<String>,
    pub min_length: usize,
    pub max_length: usize,
    pub max_input_chars: usize,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    pub timeout_secs: u64,
    /// Path to the awful_aj `config.yaml` (LLM backend only).
    pub llm_config: Option<String>,
    /// awful_aj chat template name (LLM backend only).
    pub template: String,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::HuggingFace,
            endpoint: huggingface::DEFAULT_ENDPOINT.to_string(),
            model: huggingface::DEFAULT_MODEL.to_string(),
            api_token: None,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_retries: 2,
            retry_base_ms: 1_000,
            timeout_secs: 60,
            llm_config: None,
            template: DEFAULT_LLM_TEMPLATE.to_string(),
        }
    }
}

/// Unvalidated settings, as read from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub category: String,
    pub language: String,
    pub country: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_timeout_secs: u64,
    pub period_secs: u64,
    pub poll_secs: u64,
    pub newsapi_base_url: String,
    pub http_timeout_secs: u64,
    pub summarizer: SummarizerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let query = HeadlineQuery::default();
        Self {
            category: query.category,
            language: query.language,
            country: query.country,
            sender: "webhost@summary.com".to_string(),
            recipient: "digest@summary.com".to_string(),
            subject: DEFAULT_TITLE.to_string(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_timeout_secs: 30,
            period_secs: 60 * 60,
            poll_secs: 60,
            newsapi_base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: 30,
            summarizer: SummarizerSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Apply command-line flags (and their env fallbacks) on top of the file.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut self.category, &cli.category);
        set(&mut self.language, &cli.language);
        set(&mut self.country, &cli.country);
        set(&mut self.sender, &cli.sender);
        set(&mut self.recipient, &cli.recipient);
        set(&mut self.smtp_host, &cli.smtp_host);
        set(&mut self.smtp_port, &cli.smtp_port);
        set(&mut self.period_secs, &cli.period_secs);
        set(&mut self.poll_secs, &cli.poll_secs);
        set(&mut self.summarizer.backend, &cli.summarizer);
        set(&mut self.summarizer.model, &cli.model);
        if cli.hf_token.is_some() {
            self.summarizer.api_token = cli.hf_token.clone();
        }
    }
}

/// Validated configuration for the whole process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub query: HeadlineQuery,
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_timeout: Duration,
    pub period: Duration,
    pub poll: Duration,
    pub newsapi_base_url: String,
    pub http_timeout: Duration,
    pub summarizer: SummarizerSettings,
}

impl AppConfig {
    /// Merge defaults, the optional config file, and the CLI, then validate.
    #[instrument(level = "info", skip_all, fields(config = ?cli.config))]
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut settings = match &cli.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        settings.apply_overrides(cli);

        let config = Self::from_settings(settings, cli.newsapi_key.as_deref())?;
        info!(
            category = %config.query.category,
            language = %config.query.language,
            country = %config.query.country,
            to = %config.to,
            period_secs = config.period.as_secs(),
            backend = ?config.summarizer.backend,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn from_settings(settings: Settings, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let from = parse_mailbox("sender", &settings.sender)?;
        let to = parse_mailbox("recipient", &settings.recipient)?;

        let s = &settings.summarizer;
        if s.min_length > s.max_length {
            return Err(ConfigError::Invalid(format!(
                "summarizer.min_length ({}) exceeds summarizer.max_length ({})",
                s.min_length, s.max_length
            )));
        }
        if s.max_input_chars == 0 {
            return Err(ConfigError::Invalid("summarizer.max_input_chars must be positive".into()));
        }
        if settings.period_secs == 0 || settings.poll_secs == 0 {
            return Err(ConfigError::Invalid("period_secs and poll_secs must be positive".into()));
        }
        if let Err(e) = Url::parse(&settings.newsapi_base_url) {
            return Err(ConfigError::Invalid(format!(
                "newsapi_base_url {:?} is not a valid URL: {e}",
                settings.newsapi_base_url
            )));
        }
        for (name, value) in [
            ("category", &settings.category),
            ("language", &settings.language),
            ("country", &settings.country),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }

        Ok(Self {
            api_key,
            query: HeadlineQuery {
                category: settings.category,
                language: settings.language,
                country: settings.country,
            },
            from,
            to,
            subject: settings.subject,
            smtp_host: settings.smtp_host,
            smtp_port: settings.smtp_port,
            smtp_timeout: Duration::from_secs(settings.smtp_timeout_secs),
            period: Duration::from_secs(settings.period_secs),
            poll: Duration::from_secs(settings.poll_secs),
            newsapi_base_url: settings.newsapi_base_url,
            http_timeout: Duration::from_secs(settings.http_timeout_secs),
            summarizer: settings.summarizer,
        })
    }
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value.parse().map_err(|source| ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
        source,
    })
}
