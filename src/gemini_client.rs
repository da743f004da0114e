use crate::config::Config;
use crate::error::GenerateError;
use crate::gemini::{extract_text, GeminiRequest, GeminiResponse};
use crate::models::{remote_error_message, ConversationTurn, SamplingConfig};
use crate::request_id::{RequestId, REQUEST_ID_HEADER};
use crate::sanitize::{prepare_prompt, safe_text};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Per-call overrides. Anything left `None` falls back to the client's [`Config`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub sampling: Option<SamplingConfig>,
    pub model: Option<String>,
    pub timeout: Option<Duration>,
    pub system_instruction: Option<String>,
    pub response_schema: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Arc<reqwest::Client>,
    api_key: String,
    config: Config,
}

impl GeminiClient {
    /// Fails with [`GenerateError::Configuration`] when no credential is configured.
    pub fn new(http_client: Arc<reqwest::Client>, config: Config) -> Result<Self, GenerateError> {
        let api_key = config.api_key()?;
        Ok(Self { http_client, api_key, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_target_url(&self, model: &str) -> Result<Url, GenerateError> {
        let api_base = &self.config.api_base;
        let mut url = Url::parse(api_base)
            .map_err(|e| GenerateError::configuration(format!("Invalid api_base {}: {}", api_base, e)))?;
        // The model id is one encoded segment; `?`, `#` and `/` stay inside it.
        url.path_segments_mut()
            .map_err(|_| GenerateError::configuration(format!("Invalid api_base {}", api_base)))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{}:generateContent", model));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Sends `prompt` after `history` and returns the model's text.
    ///
    /// A blank prompt resolves to an empty string without touching the network.
    /// A successful response whose body does not have the expected shape also
    /// resolves to an empty string; only HTTP failures and the deadline produce
    /// errors.
    pub async fn generate(
        &self,
        prompt: &str,
        history: &[ConversationTurn],
        options: &GenerateOptions,
    ) -> Result<String, GenerateError> {
        let Some(prompt) = prepare_prompt(prompt) else {
            debug!("Blank prompt, no request sent");
            return Ok(String::new());
        };

        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());
        let sampling = options.sampling.unwrap_or(self.config.sampling);

        let mut request = GeminiRequest::build(&prompt, history, &sampling);
        if let Some(instruction) = &options.system_instruction {
            request = request.with_system_instruction(instruction);
        }
        if let Some(schema) = &options.response_schema {
            request = request.with_json_schema(schema.clone());
        }

        let url = self.build_target_url(model)?;
        let request_id = RequestId::new();
        let span = info_span!("generate", request_id = %request_id, model = %model);
        self.send(url, &request, &request_id, timeout).instrument(span).await
    }

    async fn send(
        &self,
        url: Url,
        request: &GeminiRequest,
        request_id: &RequestId,
        timeout: Duration,
    ) -> Result<String, GenerateError> {
        // The key sits in the query string, so only the path is logged.
        info!("Sending request to: {}", url.path());
        debug!(
            "request body: {}",
            serde_json::to_string(request).unwrap_or_default()
        );

        let exchange = async {
            let response = self
                .http_client
                .post(url)
                .header("Content-Type", "application/json")
                .header(REQUEST_ID_HEADER, request_id.0.as_str())
                .json(request)
                .send()
                .await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        // Dropping `exchange` on expiry cancels the in-flight request.
        let (status, body) = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                let e = e.without_url();
                warn!("Request failed: {}", e);
                return Err(GenerateError::transport(e.to_string()));
            }
            Err(_) => {
                warn!("Request timed out after {:?}", timeout);
                return Err(GenerateError::Timeout);
            }
        };

        let data: Option<Value> = serde_json::from_slice(&body).ok();
        handle_response(status, data)
    }
}

fn handle_response(status: StatusCode, data: Option<Value>) -> Result<String, GenerateError> {
    if !status.is_success() {
        let message = data.as_ref().and_then(remote_error_message);
        let err = GenerateError::remote(status.as_u16(), message);
        warn!("Upstream returned {}: {}", status, err);
        return Err(err);
    }

    let Some(data) = data else {
        warn!("Response body is not JSON, returning empty text");
        return Ok(String::new());
    };

    log_metadata(&data);
    Ok(safe_text(&extract_text(&data)).trim().to_string())
}

fn log_metadata(data: &Value) {
    let Some(resp) = GeminiResponse::from_body(data) else {
        return;
    };
    if let Some(reason) = resp.candidates.first().and_then(|c| c.finish_reason.as_ref()) {
        debug!(model_version = ?resp.model_version, "finish reason: {:?}", reason);
    } else if let Some(version) = &resp.model_version {
        debug!("model version: {}", version);
    }
    if let Some(usage) = &resp.usage_metadata {
        debug!(
            prompt_tokens = ?usage.prompt_token_count,
            candidate_tokens = ?usage.candidates_token_count,
            total_tokens = ?usage.total_token_count,
            "token usage"
        );
    }
    if let Some(block) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        warn!("Prompt was blocked: {:?}", block);
    }
}
