use thiserror::Error;

/// Generic message shown for any failed submission or status request.
pub const GENERIC_SUBMIT_ERROR: &str = "An error occurred. Please try again.";
pub const GENERIC_LOAD_ERROR: &str = "Error loading grant application. Please try again.";
pub const GENERIC_SAVE_ERROR: &str = "Error saving document. Please try again.";
pub const MISSING_FIELDS: &str = "Please fill out all fields";

/// Client-level error type.
/// Every variant collapses to a generic user-facing message; the distinction
/// only survives in the log.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service reported an error: {0}")]
    Declared(String),
}

impl ClientError {
    /// Logs the specific failure and returns the message a user should see.
    /// `fallback` is the generic text for the action that failed.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Http(e) => {
                tracing::error!("Network error: {e}");
                fallback.to_string()
            }
            ClientError::Api { status, message } => {
                tracing::error!("Service returned {status}: {message}");
                fallback.to_string()
            }
            ClientError::Parse(e) => {
                tracing::error!("Malformed response: {e}");
                fallback.to_string()
            }
            ClientError::Io(e) => {
                tracing::error!("I/O error: {e}");
                fallback.to_string()
            }
            ClientError::Validation(msg) => {
                tracing::warn!("Validation failed: {msg}");
                msg.clone()
            }
            ClientError::Declared(msg) => {
                tracing::warn!("Service declared an error: {msg}");
                msg.clone()
            }
        }
    }
}
