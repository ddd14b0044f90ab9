//! Wire types for the video-generation backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorReport;

pub const GENERATE_PATH: &str = "/generate";
pub const FILE_FIELD: &str = "file";
pub const SCRIPT_FIELD: &str = "script";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub video_url: Option<String>,
}

impl GenerateResponse {
    /// Parses a 2xx body. Anything that is not an object with a string
    /// `video_url` yields `None`.
    pub fn video_url_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .and_then(|response| response.video_url)
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Extracts a displayable `detail` from an error body, if present.
    ///
    /// String details are used verbatim; structured ones (lists of field
    /// errors, objects) are rendered as compact JSON.
    pub fn detail_from_body(body: &[u8]) -> Option<String> {
        let detail = serde_json::from_slice::<Self>(body).ok()?.detail?;
        let text = match detail {
            Value::Null => return None,
            Value::String(text) => text,
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Outcome of one submission as printed by front ends in JSON mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionReport {
    VideoUrl(String),
    Error(ErrorReport),
}
