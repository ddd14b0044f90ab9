//! Submission workflow: form state, the loading flag and the settled result.

use std::{path::Path, sync::Arc};

use shared::error::SubmissionError;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    form::{FormInput, ImageFile, ImageLoadError},
    VideoGenerator,
};

pub const PROGRESS_MESSAGE: &str = "Please wait, video generation can take up to a minute...";
const SUBMIT_LABEL: &str = "Generate Video";
const SUBMIT_LABEL_LOADING: &str = "Generating Video...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    VideoUrl(String),
    Failed(SubmissionError),
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    LoadingChanged(bool),
    Settled(SubmissionOutcome),
}

/// At most one of `video_url` and `error` is set. `loading` is true only
/// while a submission is in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmissionState {
    pub form: FormInput,
    pub video_url: Option<String>,
    pub error: Option<SubmissionError>,
    pub loading: bool,
}

impl SubmissionState {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn can_submit(&self) -> bool {
        !self.loading
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            SUBMIT_LABEL_LOADING
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn progress_message(&self) -> Option<&'static str> {
        self.loading.then_some(PROGRESS_MESSAGE)
    }

    pub fn script_char_count(&self) -> usize {
        self.form.script_char_count()
    }
}

pub struct SubmissionController {
    generator: Arc<dyn VideoGenerator>,
    state: SubmissionState,
    events: broadcast::Sender<ControllerEvent>,
}

impl SubmissionController {
    pub fn new(generator: Arc<dyn VideoGenerator>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            generator,
            state: SubmissionState::default(),
            events,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn select_image(&mut self, image: ImageFile) {
        self.state.form.image = Some(image);
    }

    /// Reads and selects the image at `path`. On failure the previous
    /// selection is kept.
    pub async fn select_image_path(&mut self, path: &Path) -> Result<(), ImageLoadError> {
        let image = ImageFile::from_path(path).await?;
        info!(
            filename = image.filename(),
            kind = image.kind().mime_type(),
            size_bytes = image.bytes().len(),
            "image selected"
        );
        self.select_image(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.state.form.image = None;
    }

    pub fn set_script(&mut self, script: impl Into<String>) {
        self.state.form.script = script.into();
    }

    /// Runs one submission to completion. Returns `None` without touching
    /// state when a submission is already in flight. Dropping the returned
    /// future clears `loading` and leaves no result.
    pub async fn submit(&mut self) -> Option<SubmissionOutcome> {
        if self.state.loading {
            warn!("submit ignored: a submission is already in flight");
            return None;
        }

        let generator = self.generator.clone();
        let in_flight = InFlight::begin(&mut self.state, &self.events);

        let outcome = match in_flight.state.form.validate() {
            Ok(form) => match generator.generate(&form).await {
                Ok(video_url) => SubmissionOutcome::VideoUrl(video_url),
                Err(err) => SubmissionOutcome::Failed(err),
            },
            Err(err) => {
                info!(%err, "submission rejected by local validation");
                SubmissionOutcome::Failed(err.into())
            }
        };

        in_flight.settle(outcome.clone());
        Some(outcome)
    }
}

/// Holds `loading` for the lifetime of one submission. If the submit future
/// is dropped before settling, loading is cleared with no result recorded.
struct InFlight<'a> {
    state: &'a mut SubmissionState,
    events: &'a broadcast::Sender<ControllerEvent>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(
        state: &'a mut SubmissionState,
        events: &'a broadcast::Sender<ControllerEvent>,
    ) -> Self {
        state.video_url = None;
        state.error = None;
        state.loading = true;
        let _ = events.send(ControllerEvent::LoadingChanged(true));
        Self {
            state,
            events,
            settled: false,
        }
    }

    fn settle(mut self, outcome: SubmissionOutcome) {
        match &outcome {
            SubmissionOutcome::VideoUrl(url) => {
                info!(video_url = %url, "submission succeeded");
                self.state.video_url = Some(url.clone());
            }
            SubmissionOutcome::Failed(err) => {
                warn!(kind = ?err.kind(), %err, "submission failed");
                self.state.error = Some(err.clone());
            }
        }
        self.state.loading = false;
        self.settled = true;
        let _ = self.events.send(ControllerEvent::LoadingChanged(false));
        let _ = self.events.send(ControllerEvent::Settled(outcome));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("submission dropped before settling");
        self.state.loading = false;
        let _ = self.events.send(ControllerEvent::LoadingChanged(false));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
