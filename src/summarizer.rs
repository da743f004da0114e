use crate::error::SummaryError;
use crate::gemini_client::{GeminiClient, GenerateOptions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to summarize notes. Please try again with shorter text.";

const SUMMARY_INSTRUCTION: &str = "Summarize the following study notes for a Bangladeshi SSC/HSC student revising for exams. \
Give a short title, a brief summary paragraph, the key points as a list, and definitions of important terms if there are any.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub title: String,
    pub summary: String,
    #[serde(rename = "keyPoints")]
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Vec<Definition>>,
}

fn summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "summary": {"type": "STRING"},
            "keyPoints": {"type": "ARRAY", "items": {"type": "STRING"}},
            "definitions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "term": {"type": "STRING"},
                        "definition": {"type": "STRING"}
                    },
                    "required": ["term", "definition"]
                }
            }
        },
        "required": ["title", "summary", "keyPoints"]
    })
}

/// Models sometimes wrap JSON output in a markdown fence even when asked not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_summary(text: &str) -> Result<NoteSummary, SummaryError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

pub struct NoteSummarizer {
    client: GeminiClient,
    options: GenerateOptions,
}

impl NoteSummarizer {
    pub fn new(client: GeminiClient) -> Self {
        Self::with_options(client, GenerateOptions::default())
    }

    pub fn with_options(client: GeminiClient, mut options: GenerateOptions) -> Self {
        options.response_schema = Some(summary_schema());
        if options.system_instruction.is_none() {
            options.system_instruction = Some(SUMMARY_INSTRUCTION.to_string());
        }
        Self { client, options }
    }

    /// `Ok(None)` when there is nothing to summarize or the model returned no text.
    pub async fn summarize(&self, notes: &str) -> Result<Option<NoteSummary>, SummaryError> {
        if notes.trim().is_empty() {
            return Ok(None);
        }

        let text = self.client.generate(notes, &[], &self.options).await?;
        if text.is_empty() {
            info!("Model returned no summary text");
            return Ok(None);
        }
        debug!("summary text: {}", text);

        let summary = parse_summary(&text)?;
        info!("Summarized notes into {} key points", summary.key_points.len());
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::GenerateError;
    use mockito::Matcher;
    use std::sync::Arc;

    const PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn summarizer_for(server: &mockito::Server) -> NoteSummarizer {
        let config = Config {
            api_key: Some("test-key".to_string()),
            api_base: format!("{}/v1beta", server.url()),
            ..Default::default()
        };
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        NoteSummarizer::new(GeminiClient::new(Arc::new(http), config).unwrap())
    }

    fn model_reply(text: &str) -> String {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
    }

    #[test]
    fn test_parse_plain_json() {
        let s = parse_summary(r#"{"title":"Cells","summary":"Basic unit of life.","keyPoints":["Nucleus","Membrane"]}"#).unwrap();
        assert_eq!(s.title, "Cells");
        assert_eq!(s.key_points, vec!["Nucleus", "Membrane"]);
        assert_eq!(s.definitions, None);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"title\":\"Acids\",\"summary\":\"pH below 7.\",\"keyPoints\":[],\"definitions\":[{\"term\":\"pH\",\"definition\":\"acidity scale\"}]}\n```";
        let s = parse_summary(text).unwrap();
        assert_eq!(s.title, "Acids");
        assert_eq!(s.definitions.unwrap()[0].term, "pH");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_summary("not json"), Err(SummaryError::InvalidSummary(_))));
    }

    #[tokio::test]
    async fn test_blank_notes_send_nothing() {
        let mut server = mockito::Server::new_async().await;
        let m = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let summarizer = summarizer_for(&server);
        assert_eq!(summarizer.summarize(" \n ").await.unwrap(), None);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_requests_json_schema() {
        let mut server = mockito::Server::new_async().await;
        let reply = r#"{"title":"Photosynthesis","summary":"Plants make food from light.","keyPoints":["Needs chlorophyll","Releases oxygen"]}"#;
        let m = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Plants use sunlight..."}]}],
                "generationConfig": {"responseMimeType": "application/json"},
                "systemInstruction": {"parts": [{"text": SUMMARY_INSTRUCTION}]}
            })))
            .with_status(200)
            .with_body(model_reply(reply))
            .create_async()
            .await;

        let summary = summarizer_for(&server).summarize("Plants use sunlight...").await.unwrap().unwrap();
        assert_eq!(summary.title, "Photosynthesis");
        assert_eq!(summary.key_points.len(), 2);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_model_text_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        assert_eq!(summarizer_for(&server).summarize("notes").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_garbled_model_text_is_invalid_summary() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(model_reply("Here is your summary: cells are small."))
            .create_async()
            .await;

        let err = summarizer_for(&server).summarize("notes").await.unwrap_err();
        assert!(matches!(err, SummaryError::InvalidSummary(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"message": "Request payload size exceeds the limit"}}).to_string())
            .create_async()
            .await;

        let err = summarizer_for(&server).summarize("notes").await.unwrap_err();
        match err {
            SummaryError::Generate(GenerateError::Remote { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Request payload size exceeds the limit");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
