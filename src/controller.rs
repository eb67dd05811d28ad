//! Form controller: live validation, format lookup and the download lifecycle.
//!
//! All state lives in one `FormState` behind a mutex owned by the controller.
//! The lock is never held across an await; the busy check and the busy flag
//! are set under a single acquisition so concurrent submits cannot both pass.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::backend::{Backend, FileSaver};
use crate::config::ClientConfig;
use crate::errors::{translate, ClientError, SubmitError};
use crate::models::{
    DownloadOutcome, DownloadRequest, FormatsReply, MediaFormat, SaveLink, ValidationResult,
};
use crate::state::FormState;
use crate::validator::validate_format;
use crate::view::{FormView, StatusKind};

pub const SUBMIT_LABEL: &str = "Download";
pub const BUSY_LABEL: &str = "Processing...";
pub const BUSY_MESSAGE: &str = "Please wait for the current download to finish";
pub const FORMAT_LOCKED_MESSAGE: &str =
    "Please wait for current download to finish before changing format";
pub const DOWNLOADING_MESSAGE: &str = "Downloading... Please wait";
pub const NO_FORMATS_MESSAGE: &str = "No video formats found. Using default quality.";
pub const GENERIC_FAILURE: &str = "Unable to process download. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatsLoad {
    Rendered(usize),
    Empty,
    Failed(String),
    /// A newer lookup started before this one answered; nothing was shown.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Reachable(u16),
    /// The probe failed; the URL is still treated as valid.
    Unknown,
    Skipped,
}

enum Admission {
    Busy,
    Invalid(String),
    Accepted(DownloadRequest),
}

/// Releases the busy lock when dropped, so a cancelled submit unlocks too.
struct DownloadLock<'a> {
    controller: &'a FormController,
}

impl Drop for DownloadLock<'_> {
    fn drop(&mut self) {
        self.controller.reset_download_state();
    }
}

pub struct FormController {
    backend: Arc<dyn Backend>,
    saver: Arc<dyn FileSaver>,
    view: Arc<dyn FormView>,
    config: ClientConfig,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn new(
        backend: Arc<dyn Backend>,
        saver: Arc<dyn FileSaver>,
        view: Arc<dyn FormView>,
        config: ClientConfig,
    ) -> Self {
        Self {
            backend,
            saver,
            view,
            config,
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FormState {
        self.state().clone()
    }

    /// Puts the form into its initial shape: mp3, no qualities, submit disabled.
    pub fn initialize(&self) {
        {
            let mut state = self.state();
            state.format = MediaFormat::Mp3;
            state.clear_quality();
            state.submit_enabled = false;
        }
        self.view.select_format(MediaFormat::Mp3);
        self.view.set_quality_panel_visible(false);
        self.view.clear_quality();
        self.view.set_submit(false, SUBMIT_LABEL);
    }

    fn set_status(&self, message: &str, kind: StatusKind) {
        self.state().status = Some(kind);
        self.view.show_status(message, kind);
    }

    fn clear_status(&self) {
        self.state().status = None;
        self.view.clear_status();
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.state().submit_enabled = enabled;
        self.view.set_submit(enabled, SUBMIT_LABEL);
    }

    fn clear_quality(&self) {
        self.state().clear_quality();
        self.view.clear_quality();
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.config.request_timeout)),
        }
    }

    /// Sets the URL field without scheduling validation.
    pub fn set_url(&self, raw: &str) {
        self.state().record_input(raw);
    }

    /// Debounced handler for edits to the URL field.
    ///
    /// Returns `None` when a later edit arrived during the quiet period or a
    /// download is running.
    pub async fn input_changed(&self, raw: &str) -> Option<ValidationResult> {
        let generation = self.state().record_input(raw);
        tokio::time::sleep(self.config.debounce).await;

        let current = self.state().is_current_input(generation);
        if !current {
            debug!(generation, "input superseded before validation");
            return None;
        }
        self.validate_input().await
    }

    /// Validates the current field contents and updates the form accordingly.
    pub async fn validate_input(&self) -> Option<ValidationResult> {
        let (busy, url, format) = {
            let state = self.state();
            (state.is_downloading, state.trimmed_url(), state.format)
        };
        if busy {
            return None;
        }

        let result = validate_format(&url);
        if url.is_empty() {
            self.clear_status();
            self.set_submit_enabled(false);
            self.clear_quality();
            return Some(result);
        }

        match &result {
            ValidationResult::Valid { platform, .. } => {
                debug!(platform, "input validated");
                self.state().last_validated_url = Some(url.clone());
                self.set_status(&result.message(), StatusKind::Success);
                self.set_submit_enabled(true);
                if format == MediaFormat::Mp4 {
                    self.clear_quality();
                    self.load_formats(&url).await;
                }
            }
            ValidationResult::Invalid { reason } => {
                self.set_status(reason, StatusKind::Error);
                self.set_submit_enabled(false);
                self.clear_quality();
            }
        }
        Some(result)
    }

    /// Switches between mp3 and mp4. Refused while a download is running.
    pub async fn change_format(&self, format: MediaFormat) -> bool {
        let (busy, previous, url) = {
            let state = self.state();
            (state.is_downloading, state.format, state.trimmed_url())
        };
        if busy {
            self.view.select_format(previous);
            self.set_status(FORMAT_LOCKED_MESSAGE, StatusKind::Error);
            return false;
        }

        self.state().format = format;
        self.view.select_format(format);

        match format {
            MediaFormat::Mp4 => {
                self.view.set_quality_panel_visible(true);
                if !url.is_empty() && validate_format(&url).is_valid() {
                    self.clear_quality();
                    self.load_formats(&url).await;
                }
            }
            MediaFormat::Mp3 => {
                self.view.set_quality_panel_visible(false);
                self.clear_quality();
            }
        }
        true
    }

    /// Picks one of the rendered resolutions. Nothing can be picked while no
    /// options are rendered; the configured default quality is sent instead.
    pub fn select_quality(&self, quality: &str) -> bool {
        let mut state = self.state();
        if state.is_downloading {
            return false;
        }

        let quality = quality.trim();
        let offered = state
            .quality_options
            .iter()
            .any(|o| o.height.to_string() == quality);
        if !offered {
            debug!(quality, "quality not among rendered options");
            return false;
        }

        state.selected_quality = Some(quality.to_string());
        self.view
            .render_quality_options(&state.quality_options, Some(quality), false);
        true
    }

    /// Fetches the resolutions the backend offers for `url`.
    pub async fn load_formats(&self, url: &str) -> FormatsLoad {
        let token = self.state().begin_format_load();
        self.view.clear_quality();
        self.view.set_quality_loading(true);

        let result = self.with_deadline(self.backend.get_formats(url)).await;

        let mut state = self.state();
        if !state.is_current_format_load(token) {
            debug!(token, "discarding stale format response");
            return FormatsLoad::Stale;
        }

        let outcome = match result {
            Ok(reply) => {
                let ok = reply.is_success();
                let FormatsReply { formats, error } = reply.body;
                match (formats.filter(|f| ok && !f.is_empty()), error) {
                    (Some(formats), _) => {
                        let count = formats.len();
                        if !state.is_downloading {
                            state.selected_quality = Some(formats[0].height.to_string());
                        }
                        state.quality_options = formats;
                        self.view.render_quality_options(
                            &state.quality_options,
                            state.selected_quality.as_deref(),
                            state.is_downloading,
                        );
                        FormatsLoad::Rendered(count)
                    }
                    (None, Some(error)) => {
                        warn!(%error, "backend could not list formats");
                        let message = translate(&error);
                        self.view.show_quality_error(&message);
                        FormatsLoad::Failed(message)
                    }
                    (None, None) => {
                        self.view.show_quality_error(NO_FORMATS_MESSAGE);
                        FormatsLoad::Empty
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "format lookup failed");
                let message = translate(&e.to_string());
                self.view.show_quality_error(&message);
                FormatsLoad::Failed(message)
            }
        };

        self.view.set_quality_loading(false);
        outcome
    }

    /// Opportunistic existence check run when the URL field loses focus.
    ///
    /// Never changes the form: a failed probe leaves the URL valid.
    pub async fn field_blurred(&self) -> ProbeResult {
        let (busy, url) = {
            let state = self.state();
            (state.is_downloading, state.trimmed_url())
        };
        if busy {
            return ProbeResult::Skipped;
        }
        let ValidationResult::Valid { normalized_url, .. } = validate_format(&url) else {
            return ProbeResult::Skipped;
        };

        match self.with_deadline(self.backend.probe(&normalized_url)).await {
            Ok(status) => {
                debug!(status, url = %normalized_url, "existence probe answered");
                ProbeResult::Reachable(status)
            }
            Err(e) => {
                debug!(error = %e, "existence probe failed, keeping URL valid");
                ProbeResult::Unknown
            }
        }
    }

    /// Submits the current form. At most one download runs per controller.
    pub async fn submit(&self) -> Result<DownloadOutcome, SubmitError> {
        let admission = {
            let mut state = self.state();
            if state.is_downloading {
                Admission::Busy
            } else {
                let url = state.trimmed_url();
                match validate_format(&url) {
                    ValidationResult::Invalid { reason } => Admission::Invalid(reason),
                    ValidationResult::Valid { .. } => {
                        state.is_downloading = true;
                        state.last_validated_url = Some(url.clone());
                        Admission::Accepted(DownloadRequest {
                            url,
                            format: state.format,
                            quality: state.quality_or(&self.config.default_quality),
                        })
                    }
                }
            }
        };

        let request = match admission {
            Admission::Busy => {
                self.set_status(BUSY_MESSAGE, StatusKind::Error);
                return Err(SubmitError::Busy);
            }
            Admission::Invalid(reason) => {
                self.set_status(&reason, StatusKind::Error);
                return Err(SubmitError::Invalid(reason));
            }
            Admission::Accepted(request) => request,
        };

        let _unlock = DownloadLock { controller: self };
        self.lock_form();
        Ok(self.run_download(&request).await)
    }

    fn lock_form(&self) {
        self.state().submit_enabled = false;
        self.view.set_controls_locked(true);
        self.view.set_submit(false, BUSY_LABEL);
        self.set_status(DOWNLOADING_MESSAGE, StatusKind::Loading);
    }

    async fn run_download(&self, request: &DownloadRequest) -> DownloadOutcome {
        info!(
            url = %request.url,
            format = %request.format,
            quality = %request.quality,
            "download started"
        );

        let reply = match self.with_deadline(self.backend.download(request)).await {
            Ok(reply) => reply,
            Err(e) => return self.fail(e.to_string()),
        };

        let ok = reply.is_success();
        let body = reply.body;
        match body.filepath {
            Some(filepath) if ok && body.success => {
                let title = body.title.unwrap_or_else(|| "video".to_string());
                let filename = body.filename.unwrap_or_else(|| {
                    filepath.rsplit('/').next().unwrap_or(&filepath).to_string()
                });
                self.set_status(&format!("Success! Downloading: {}", title), StatusKind::Success);

                let link = SaveLink::for_file(&filepath, &filename);
                match self.saver.save(&link).await {
                    Ok(path) => {
                        info!(title = %title, path = %path.display(), "download complete");
                        DownloadOutcome::Success {
                            title,
                            filepath,
                            filename,
                        }
                    }
                    Err(e) => self.fail(format!("{:#}", e)),
                }
            }
            _ => match body.error {
                Some(error) => self.fail(error),
                None => {
                    warn!(status = reply.status, "download reply carried neither success nor error");
                    self.set_status(&format!("Error: {}", GENERIC_FAILURE), StatusKind::Error);
                    DownloadOutcome::Failure {
                        raw_error_message: GENERIC_FAILURE.to_string(),
                    }
                }
            },
        }
    }

    fn fail(&self, raw: String) -> DownloadOutcome {
        warn!(error = %raw, "download failed");
        let message = translate(&raw);
        self.set_status(&format!("Error: {}", message), StatusKind::Error);
        DownloadOutcome::Failure {
            raw_error_message: raw,
        }
    }

    /// Releases the busy lock and restores every control.
    ///
    /// The outcome message stays on screen; a leftover loading line from a
    /// cancelled download is cleared.
    pub fn reset_download_state(&self) {
        let (url, status) = {
            let mut state = self.state();
            state.is_downloading = false;
            (state.trimmed_url(), state.status)
        };
        self.view.set_controls_locked(false);
        if status == Some(StatusKind::Loading) {
            self.clear_status();
        }
        self.set_submit_enabled(validate_format(&url).is_valid());
    }

    /// Recomputes the submit control from the field and the busy flag, clearing
    /// stale error lines when the field is empty or valid.
    pub fn update_button_state(&self) {
        let (url, busy, status) = {
            let state = self.state();
            (state.trimmed_url(), state.is_downloading, state.status)
        };
        let result = validate_format(&url);

        if result.is_valid() && !busy {
            self.set_submit_enabled(true);
            if status == Some(StatusKind::Error) {
                self.clear_status();
            }
        } else {
            self.set_submit_enabled(false);
            if busy {
                return;
            }
            if url.is_empty() {
                self.clear_status();
            } else {
                self.set_status(&result.message(), StatusKind::Error);
            }
        }
    }
}
