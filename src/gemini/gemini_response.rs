use crate::gemini::{GeminiCandidate, GeminiPromptFeedback, GeminiUsage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response metadata. Parsed best-effort and only used for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(rename = "promptFeedback")]
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    pub fn from_body(body: &Value) -> Option<Self> {
        serde_json::from_value(body.clone()).ok()
    }
}

/// Concatenates every string `text` of `candidates[0].content.parts`, in order.
/// Any missing or mistyped field along the way yields an empty string.
pub fn extract_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}
