use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{ReporterError, Result};
use crate::types::{Config, MetricsChunk, Narration, NarrationMetadata, NarrationRequest};

pub const PROMPT_TEMPLATE: &str = "Analyze the following Vault server metrics for a human reader.
- Summarize the overall health and status in clear, simple language.
- Highlight any anomalies, errors, or warnings.
- Suggest possible causes and recommended actions if issues are found.
- Make the summary concise, actionable, and easy to understand for someone without deep technical knowledge.

Metrics:
";

/// The only place metrics bytes are decoded; invalid UTF-8 becomes U+FFFD.
pub fn build_prompt(metrics: &[u8]) -> String {
    format!("{}{}", PROMPT_TEMPLATE, String::from_utf8_lossy(metrics))
}

pub fn build_request(cfg: &Config, metrics: &[u8]) -> NarrationRequest {
    NarrationRequest {
        model: cfg.llm_model.clone(),
        prompt: build_prompt(metrics),
        max_tokens: cfg.llm_max_tokens,
        metadata: NarrationMetadata {
            trace_name: cfg.llm_trace_name.clone(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
struct CompletionResponse {
    #[serde(default, alias = "Choices", alias = "CHOICES")]
    choices: Option<Vec<CompletionChoice>>,
    #[serde(default, alias = "Result", alias = "RESULT")]
    result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionChoice {
    #[serde(default, alias = "Text", alias = "TEXT")]
    text: Option<String>,
}

/// Picks the narration out of a response body whose shape is not fixed.
///
/// Order: first choice's `text`, then top-level `result`, then the body as-is.
/// A body that fails to decode is not an error, and is kept byte for byte.
pub fn interpret_response(body: Vec<u8>) -> Narration {
    if let Ok(parsed) = serde_json::from_slice::<CompletionResponse>(&body) {
        let choice = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|c| c.text)
            .filter(|t| !t.is_empty());
        if let Some(text) = choice {
            return Narration::StructuredChoice(text);
        }
        if let Some(result) = parsed.result.filter(|r| !r.is_empty()) {
            return Narration::StructuredResult(result);
        }
    }
    Narration::Raw(body)
}

pub struct Narrator<'a> {
    client: &'a reqwest::Client,
    config: &'a Config,
}

impl<'a> Narrator<'a> {
    pub fn new(client: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    pub async fn narrate(&self, chunk: &MetricsChunk) -> Result<Narration> {
        let request = build_request(self.config, &chunk.bytes);
        debug!("POST {} ({} prompt bytes)", self.config.llm_url, request.prompt.len());

        let res = self
            .client
            .post(&self.config.llm_url)
            .bearer_auth(&self.config.llm_token)
            .json(&request)
            .send()
            .await
            .map_err(|source| ReporterError::Network { endpoint: "LLM API", source })?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|source| ReporterError::Network { endpoint: "LLM API", source })?;
        if !status.is_success() {
            error!("LLM API returned {} for {}", status, chunk.position.describe());
            return Err(ReporterError::Response {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let narration = interpret_response(body.to_vec());
        debug!("narration extracted from {} field", narration.kind());
        Ok(narration)
    }
}
