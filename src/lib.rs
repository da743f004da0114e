pub mod config;
pub mod error;
pub mod gemini;
pub mod gemini_client;
pub mod logging;
pub mod mentor;
pub mod models;
pub mod request_id;
pub mod sanitize;
pub mod summarizer;

pub use config::Config;
pub use error::{GenerateError, SummaryError};
pub use gemini_client::{GeminiClient, GenerateOptions};
pub use mentor::{ChatMessage, ChatRole, MentorSession};
pub use models::{ConversationTurn, SamplingConfig, Speaker};
pub use summarizer::{NoteSummarizer, NoteSummary};
