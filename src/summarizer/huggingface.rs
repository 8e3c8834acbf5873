//! Hugging Face Inference API summarization backend.
//!
//! Posts the article text to a hosted summarization pipeline
//! (`t5-small` by default) with deterministic decoding and fixed length
//! bounds, and returns the first `summary_text` of the response.

use super::Summarize;
use crate::error::{ConfigError, SummarizationError};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "t5-small";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: Parameters,
    options: Options,
}

#[derive(Serialize)]
struct Parameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

pub struct HuggingFaceSummarizer {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl HuggingFaceSummarizer {
    pub fn new(
        endpoint: &str,
        model: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let raw = format!("{}/models/{}", endpoint.trim_end_matches('/'), model);
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::Invalid(format!("summarizer endpoint {raw:?}: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

impl fmt::Debug for HuggingFaceSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceSummarizer")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Summarize for HuggingFaceSummarizer {
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
    async fn summarize(
        &self,
        text: &str,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, SummarizationError> {
        let t0 = Instant::now();
        let body = InferenceRequest {
            inputs: text,
            parameters: Parameters {
                min_length: min_len,
                max_length: max_len,
                do_sample: false,
            },
            options: Options {
                wait_for_model: true,
            },
        };

        let mut req = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let raw = resp.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&raw, 300),
                "Summarizer returned an error status"
            );
            return Err(SummarizationError::Rejected {
                status: status.as_u16(),
                body: truncate_for_log(&raw, 300),
            });
        }

        let outputs: Vec<SummaryOutput> = serde_json::from_str(&raw)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            candidates = outputs.len(),
            "Summarizer responded"
        );
        outputs
            .into_iter()
            .map(|o| o.summary_text)
            .find(|s| !s.trim().is_empty())
            .ok_or(SummarizationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summarizer(server: &MockServer, token: Option<&str>) -> HuggingFaceSummarizer {
        HuggingFaceSummarizer::new(
            &server.uri(),
            DEFAULT_MODEL,
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sends_bounds_and_returns_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/t5-small"))
            .and(header("authorization", "Bearer hf_test"))
            .and(body_partial_json(json!({
                "inputs": "Stocks rallied.",
                "parameters": {"min_length": 30, "max_length": 80, "do_sample": false}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"summary_text": "stocks rallied on tuesday ."}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let out = summarizer(&server, Some("hf_test"))
            .summarize("Stocks rallied.", 30, 80)
            .await
            .unwrap();
        assert_eq!(out, "stocks rallied on tuesday .");
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"error": "Model t5-small is currently loading"})),
            )
            .mount(&server)
            .await;

        let err = summarizer(&server, None)
            .summarize("text", 30, 80)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::Rejected { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_empty_array_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = summarizer(&server, None)
            .summarize("text", 30, 80)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generated_text": "x"})))
            .mount(&server)
            .await;

        let err = summarizer(&server, None)
            .summarize("text", 30, 80)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::Decode(_)));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let hf = HuggingFaceSummarizer::new(DEFAULT_ENDPOINT, DEFAULT_MODEL, Some("  ".into()), Duration::from_secs(1))
            .unwrap();
        assert!(hf.token.is_none());
        assert_eq!(hf.url.as_str(), "https://api-inference.huggingface.co/models/t5-small");
    }
}
