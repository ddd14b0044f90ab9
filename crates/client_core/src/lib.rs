use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    error::SubmissionError,
    protocol::{ErrorBody, GenerateResponse, FILE_FIELD, GENERATE_PATH, SCRIPT_FIELD},
};
use tracing::{debug, info, warn};

pub mod config;
pub mod controller;
pub mod form;

pub use controller::{
    ControllerEvent, SubmissionController, SubmissionOutcome, SubmissionState, PROGRESS_MESSAGE,
};
pub use form::{FormInput, ImageFile, ImageLoadError, ValidatedForm};

/// The external collaborator that turns an image and a script into a video.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn generate(&self, form: &ValidatedForm) -> Result<String, SubmissionError>;
}

/// HTTP client for the `/generate` endpoint.
pub struct VideoClient {
    http: Client,
    base_url: String,
}

impl VideoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn generate_url(&self) -> String {
        format!("{}{GENERATE_PATH}", self.base_url)
    }

    fn multipart_body(form: &ValidatedForm) -> Result<Form, SubmissionError> {
        let image = form.image();
        let file_part = Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.kind().mime_type())
            .map_err(|e| SubmissionError::Unexpected(e.to_string()))?;

        Ok(Form::new()
            .part(FILE_FIELD, file_part)
            .text(SCRIPT_FIELD, form.script().to_string()))
    }
}

#[async_trait]
impl VideoGenerator for VideoClient {
    async fn generate(&self, form: &ValidatedForm) -> Result<String, SubmissionError> {
        let url = self.generate_url();
        let body = Self::multipart_body(form)?;
        info!(
            %url,
            filename = form.image().filename(),
            size_bytes = form.image().bytes().len(),
            "generate: sending request"
        );

        let response = self
            .http
            .post(&url)
            .multipart(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        // A body cut off mid-read counts as no response received.
        let bytes = response
            .bytes()
            .await
            .map_err(classify_transport_error)?;
        debug!(status = status.as_u16(), body_len = bytes.len(), "generate: response received");

        classify_response(status, &bytes)
    }
}

/// Maps a received response to a video URL or a protocol error.
pub fn classify_response(status: StatusCode, body: &[u8]) -> Result<String, SubmissionError> {
    if status.is_success() {
        return GenerateResponse::video_url_from_body(body).ok_or(SubmissionError::MissingVideoUrl);
    }

    let detail = ErrorBody::detail_from_body(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string()
    });
    Err(SubmissionError::Backend {
        status: status.as_u16(),
        detail,
    })
}

/// Maps a failed send or body read, where no complete response was
/// received, to an error.
pub fn classify_transport_error(error: reqwest::Error) -> SubmissionError {
    if error.is_builder() {
        warn!(%error, "generate: request could not be built");
        return SubmissionError::Unexpected(error.to_string());
    }

    warn!(
        %error,
        connect = error.is_connect(),
        timeout = error.is_timeout(),
        "generate: no response from backend"
    );
    SubmissionError::Network {
        reason: error.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
