use thiserror::Error;

/// Errors raised while talking to the remote search API
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport failure: refused connection, DNS, timeout
    #[error("{0}")]
    Connectivity(String),

    /// Non-OK status; `body` is the response text when it could be read
    #[error("HTTP {status}{}", fmt_body(.body))]
    Http { status: u16, body: String },

    /// Body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The requested document does not exist
    #[error("Document '{0}' not found")]
    NotFound(String),

    /// Search options rejected before any request was sent
    #[error("Invalid search options: {0}")]
    InvalidOptions(String),
}

impl ClientError {
    /// Human readable reason, with a generic fallback for empty messages
    pub fn reason(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Connectivity(err.to_string())
        }
    }
}

fn fmt_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
