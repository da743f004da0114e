use crate::gemini::GeminiPart;
use crate::models::ConversationTurn;
use crate::sanitize::safe_text;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user" or "model"
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(|r| r.to_string()),
            parts: vec![GeminiPart { text: safe_text(text) }],
        }
    }
}

impl From<&ConversationTurn> for GeminiContent {
    fn from(turn: &ConversationTurn) -> Self {
        GeminiContent::text(Some(turn.speaker.as_str()), &turn.text)
    }
}
