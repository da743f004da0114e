use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str = "Request timeout. Try again.";
pub const GENERIC_MESSAGE: &str = "Something went wrong.";

/// Normalized failure of a single generation call.
///
/// `Display` yields the human-readable message a UI can show as-is.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    Configuration(String),

    #[error("Request timeout. Try again.")]
    Timeout,

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Transport(String),
}

impl GenerateError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Builds a remote error, falling back to a status-coded message when the
    /// provider did not send a usable one.
    pub fn remote(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("Gemini request failed ({})", status));
        Self::Remote { status, message }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.is_empty() {
            Self::Transport(GENERIC_MESSAGE.to_string())
        } else {
            Self::Transport(msg)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Invalid summary: {0}")]
    InvalidSummary(#[from] serde_json::Error),
}
