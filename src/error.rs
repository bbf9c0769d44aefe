use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures along the resolve-and-upload path.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("resolver returned status {0}")]
    ResolverStatus(u16),

    #[error("invalid resolver URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Transport(reqwest::Error),

    #[error("Telegram {method} failed: {description}")]
    Platform {
        method: &'static str,
        description: String,
    },
}

impl From<reqwest::Error> for RelayError {
    /// Request URLs carry the bot token, so they never reach the error text.
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.without_url())
    }
}

impl RelayError {
    /// Text relayed to the chat when the pipeline fails.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::ResolverStatus(status) => format!(
                "Failed to fetch the file from TeraBox. Status code: {}",
                status
            ),
            other => format!("An error occurred: {}", other),
        }
    }
}
