//! OpenAI-compatible LLM summarization backend (feature `llm`).
//!
//! Uses an `awful_aj` configuration (API endpoint, model, key) and a chat
//! template that frames the model as a news summarizer. The length bounds
//! are written into the prompt since chat models take no token floor.

use super::Summarize;
use crate::error::{ConfigError, SummarizationError};
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub struct LlmSummarizer {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl LlmSummarizer {
    /// Load the `awful_aj` config and chat template.
    ///
    /// `config_path` defaults to `config.yaml` in the `awful_aj` config dir.
    #[instrument(level = "info", skip_all, fields(template = %template_name))]
    pub async fn load(config_path: Option<&str>, template_name: &str) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(p) => PathBuf::from(p),
            None => awful_aj::config_dir()
                .map_err(|e| ConfigError::Llm(e.to_string()))?
                .join("config.yaml"),
        };
        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::Llm(format!("config path {path:?} is not valid UTF-8")))?;

        let config = awful_aj::config::load_config(path_str)
            .map_err(|e| ConfigError::Llm(format!("{path_str}: {e:?}")))?;
        let template = awful_aj::template::load_template(template_name)
            .await
            .map_err(|e| ConfigError::Llm(format!("template {template_name}: {e}")))?;

        info!(config_path = path_str, "Loaded LLM configuration");
        Ok(Self { config, template })
    }
}

impl fmt::Debug for LlmSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSummarizer").finish_non_exhaustive()
    }
}

/// Frame article text with the requested summary length.
fn prompt(text: &str, min_len: usize, max_len: usize) -> String {
    format!(
        "Summarize the following news article in {min_len} to {max_len} words. \
         Reply with the summary only.\n\n{text}"
    )
}

impl Summarize for LlmSummarizer {
    #[instrument(level = "debug", skip_all)]
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError> {
        let t0 = Instant::now();
        let res = ask(&self.config, prompt(text, min_len, max_len), &self.template, None, None).await;
        let dt = t0.elapsed();

        match res {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "LLM call failed");
                Err(SummarizationError::Service(e.to_string()))
            }
        }
    }
}
