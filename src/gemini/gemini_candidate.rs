use crate::gemini::GeminiFinishReason;
use serde::{Deserialize, Serialize};

// Text is pulled from the raw JSON by `extract_text`; only metadata lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiCandidate {
    #[serde(rename = "finishReason")]
    #[serde(default)]
    pub finish_reason: Option<GeminiFinishReason>,
    #[serde(default)]
    pub index: Option<u32>,
}
