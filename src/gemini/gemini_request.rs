use crate::gemini::{GeminiContent, GeminiGenerationConfig};
use crate::models::{ConversationTurn, SamplingConfig, Speaker};
use serde::{Deserialize, Serialize};

/// Body of a `generateContent` call. The model travels in the URL path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GeminiGenerationConfig,
}

impl GeminiRequest {
    /// Appends `prompt` as a user turn after `history`, keeping history order.
    /// Every turn's text goes through the same sanitization.
    pub fn build(prompt: &str, history: &[ConversationTurn], sampling: &SamplingConfig) -> Self {
        let mut contents: Vec<GeminiContent> = history.iter().map(GeminiContent::from).collect();
        contents.push(GeminiContent::text(Some(Speaker::User.as_str()), prompt));

        GeminiRequest {
            contents,
            system_instruction: None,
            generation_config: GeminiGenerationConfig::from(sampling),
        }
    }

    pub fn with_system_instruction(mut self, instruction: &str) -> Self {
        if !instruction.trim().is_empty() {
            self.system_instruction = Some(GeminiContent::text(None, instruction));
        }
        self
    }

    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.generation_config = self.generation_config.with_json_schema(schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::MAX_TEXT_CHARS;
    use serde_json::{json, Value};

    #[test]
    fn test_build_wire_format() {
        let history = vec![
            ConversationTurn::user("What is Newton's first law?"),
            ConversationTurn::model("An object stays at rest unless acted on."),
        ];
        let req = GeminiRequest::build("Give an example", &history, &SamplingConfig::default());
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "What is Newton's first law?"}]},
                    {"role": "model", "parts": [{"text": "An object stays at rest unless acted on."}]},
                    {"role": "user", "parts": [{"text": "Give an example"}]}
                ],
                "generationConfig": {
                    "temperature": 0.7,
                    "topP": 0.95,
                    "topK": 40,
                    "maxOutputTokens": 1024
                }
            })
        );
    }

    #[test]
    fn test_new_turn_is_last_and_history_untouched() {
        let history = vec![
            ConversationTurn::user("same"),
            ConversationTurn::user("same"),
            ConversationTurn::model("reply"),
        ];
        let req = GeminiRequest::build("next", &history, &SamplingConfig::default());
        let texts: Vec<&str> = req.contents.iter().map(|c| c.parts[0].text.as_str()).collect();
        assert_eq!(texts, vec!["same", "same", "reply", "next"]);
    }

    #[test]
    fn test_every_turn_is_sanitized() {
        let long = "z".repeat(MAX_TEXT_CHARS + 10);
        let history = vec![ConversationTurn::user("a\0b"), ConversationTurn::model(long.clone())];
        let req = GeminiRequest::build(&long, &history, &SamplingConfig::default());
        let body = serde_json::to_string(&req).unwrap();
        assert!(!body.contains('\0'));
        assert!(!body.contains("\\u0000"));

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "ab");
        for idx in 1..3 {
            let text = value["contents"][idx]["parts"][0]["text"].as_str().unwrap();
            assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
        }
    }

    #[test]
    fn test_overridden_sampling_and_extras() {
        let sampling = SamplingConfig { temperature: 0.1, top_k: 8, ..Default::default() };
        let req = GeminiRequest::build("hi", &[], &sampling)
            .with_system_instruction("Be brief.")
            .with_json_schema(json!({"type": "OBJECT"}));
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["generationConfig"]["temperature"], 0.1);
        assert_eq!(body["generationConfig"]["topK"], 8);
        assert_eq!(body["generationConfig"]["topP"], 0.95);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"], json!({"parts": [{"text": "Be brief."}]}));
    }

    #[test]
    fn test_blank_system_instruction_is_omitted() {
        let req = GeminiRequest::build("hi", &[], &SamplingConfig::default()).with_system_instruction("  ");
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }
}
