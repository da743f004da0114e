use crate::gemini::GeminiBlockReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    #[serde(default)]
    pub block_reason: Option<GeminiBlockReason>,
}
