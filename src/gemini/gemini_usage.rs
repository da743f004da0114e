use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiUsage {
    #[serde(rename = "promptTokenCount")]
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    #[serde(default)]
    pub total_token_count: Option<u32>,
}
