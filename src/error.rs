//! Failures of a single research submission.

/// Every way a submission can end in `Failed`.
///
/// All variants are caught at the controller and shown as one string; none
/// of them are fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResearchError {
    #[error("missing query or key")]
    Validation,

    #[error("service returned {status} {reason}")]
    Transport { status: u16, reason: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl ResearchError {
    pub fn transport(status: reqwest::StatusCode) -> Self {
        ResearchError::Transport {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
    }

    /// The text shown in the form's error box.
    pub fn user_message(&self) -> String {
        match self {
            ResearchError::Validation => {
                "Please fill in the research question and the API key".to_string()
            }
            ResearchError::Transport { status, reason } if reason.is_empty() => {
                format!("API error: {}", status)
            }
            ResearchError::Transport { status, reason } => {
                format!("API error: {} {}", status, reason)
            }
            ResearchError::MalformedResponse(_) => {
                "API error: the service returned a result that could not be read".to_string()
            }
            ResearchError::Unknown(_) => "Unknown error".to_string(),
        }
    }
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ResearchError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ResearchError::transport(status)
        } else {
            ResearchError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ResearchError {
    fn from(err: serde_json::Error) -> Self {
        ResearchError::MalformedResponse(err.to_string())
    }
}
