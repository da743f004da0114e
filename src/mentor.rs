use crate::gemini_client::{GeminiClient, GenerateOptions};
use crate::models::ConversationTurn;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub const MENTOR_SYSTEM_INSTRUCTION: &str = "You are \"Probaho AI\", a specialized educational mentor for students in Bangladesh preparing for SSC (Secondary School Certificate) and HSC (Higher Secondary Certificate) exams.
Your tone should be encouraging, academic yet accessible, and professional.
You are an expert in the NCTB (National Curriculum and Textbook Board) curriculum.
Answer questions clearly, provide step-by-step explanations for math and science, and suggest mnemonic devices for subjects like biology or history.
Always prioritize the Bangladesh NCTB syllabus context.";

pub const MENTOR_GREETING: &str = "Hello! I'm your Probaho AI Mentor. Whether it's Physics, Math, or Bangla literature, I'm here to help you ace your SSC/HSC exams. What are we studying today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: u64,
}

impl ChatMessage {
    fn now(role: ChatRole, content: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self { role, content: content.into(), timestamp }
    }

    pub fn to_turn(&self) -> ConversationTurn {
        match self.role {
            ChatRole::User => ConversationTurn::user(self.content.clone()),
            ChatRole::Assistant => ConversationTurn::model(self.content.clone()),
        }
    }
}

/// In-memory chat with the mentor persona. The transcript dies with the value.
#[derive(Debug)]
pub struct MentorSession {
    client: GeminiClient,
    options: GenerateOptions,
    messages: Vec<ChatMessage>,
}

impl MentorSession {
    pub fn new(client: GeminiClient) -> Self {
        Self::with_options(client, GenerateOptions::default())
    }

    /// `options.system_instruction` defaults to the mentor persona when unset.
    pub fn with_options(client: GeminiClient, mut options: GenerateOptions) -> Self {
        if options.system_instruction.is_none() {
            options.system_instruction = Some(MENTOR_SYSTEM_INSTRUCTION.to_string());
        }
        Self {
            client,
            options,
            messages: vec![ChatMessage::now(ChatRole::Assistant, MENTOR_GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends one user message and returns the reply that was recorded.
    ///
    /// Blank input is ignored and returns `None`. Failures never escape: the
    /// recorded reply becomes a fallback text naming the error.
    pub async fn send(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }

        let history: Vec<ConversationTurn> = self.messages.iter().map(ChatMessage::to_turn).collect();
        self.messages.push(ChatMessage::now(ChatRole::User, input));

        let reply = match self.client.generate(input, &history, &self.options).await {
            Ok(text) => {
                info!("Mentor replied with {} characters", text.chars().count());
                text
            }
            Err(e) => {
                warn!("Mentor request failed: {}", e);
                format!("Sorry, I couldn't reach the mentor right now: {}", e)
            }
        };

        self.messages.push(ChatMessage::now(ChatRole::Assistant, reply.clone()));
        Some(reply)
    }
}
