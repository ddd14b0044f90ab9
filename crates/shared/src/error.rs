use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Protocol,
    Network,
    Unexpected,
}

/// Local precondition failures, detected before anything goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select an image file.")]
    MissingImage,
    #[error("Please enter a script.")]
    EmptyScript,
    #[error("Unsupported image type '{0}'; use a PNG or JPEG file.")]
    UnsupportedImage(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 2xx response without a usable `video_url`.
    #[error("Video URL missing from backend response.")]
    MissingVideoUrl,
    /// Non-2xx response. `detail` falls back to the canonical status text.
    #[error("Backend error: {status} - {detail}")]
    Backend { status: u16, detail: String },
    /// No response was received at all.
    #[error("Network error: Could not connect to the backend server. Is it running?")]
    Network { reason: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl SubmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::MissingVideoUrl | Self::Backend { .. } => ErrorKind::Protocol,
            Self::Network { .. } => ErrorKind::Network,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Serializable form of a settled failure, for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&SubmissionError> for ErrorReport {
    fn from(value: &SubmissionError) -> Self {
        Self {
            kind: value.kind(),
            message: value.to_string(),
        }
    }
}
