//! Presentation surface of the form.
//!
//! The controller never formats output itself; it tells a `FormView` what the
//! user should see. `TerminalView` renders to stdout with indicatif spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::models::{FormatOption, MediaFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Loading,
}

pub trait FormView: Send + Sync {
    /// Replaces the status line.
    fn show_status(&self, message: &str, kind: StatusKind);

    fn clear_status(&self);

    /// Locks or unlocks the URL field, format choice and quality choice.
    fn set_controls_locked(&self, locked: bool);

    fn set_submit(&self, enabled: bool, label: &str);

    /// Puts the format choice back to `format` after a refused change.
    fn select_format(&self, format: MediaFormat);

    fn set_quality_panel_visible(&self, visible: bool);

    fn set_quality_loading(&self, loading: bool);

    fn show_quality_error(&self, message: &str);

    /// Hides the loading indicator and error, and removes every option.
    fn clear_quality(&self);

    fn render_quality_options(&self, options: &[FormatOption], selected: Option<&str>, disabled: bool);
}

pub struct TerminalView {
    status_spinner: Mutex<Option<ProgressBar>>,
    quality_spinner: Mutex<Option<ProgressBar>>,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            status_spinner: Mutex::new(None),
            quality_spinner: Mutex::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    fn stop(slot: &Mutex<Option<ProgressBar>>) {
        let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
    }

    fn start(slot: &Mutex<Option<ProgressBar>>, message: &str) {
        let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
        *slot = Some(Self::spinner(message));
    }
}

impl FormView for TerminalView {
    fn show_status(&self, message: &str, kind: StatusKind) {
        Self::stop(&self.status_spinner);
        match kind {
            StatusKind::Loading => Self::start(&self.status_spinner, message),
            StatusKind::Success => println!("✔ {}", message),
            StatusKind::Error => println!("✘ {}", message),
        }
    }

    fn clear_status(&self) {
        Self::stop(&self.status_spinner);
    }

    fn set_controls_locked(&self, locked: bool) {
        debug!(locked, "form controls");
    }

    fn set_submit(&self, enabled: bool, label: &str) {
        debug!(enabled, label, "submit control");
    }

    fn select_format(&self, format: MediaFormat) {
        println!("Format: {}", format);
    }

    fn set_quality_panel_visible(&self, visible: bool) {
        debug!(visible, "quality panel");
    }

    fn set_quality_loading(&self, loading: bool) {
        if loading {
            Self::start(&self.quality_spinner, "Loading available qualities...");
        } else {
            Self::stop(&self.quality_spinner);
        }
    }

    fn show_quality_error(&self, message: &str) {
        println!("  quality: {}", message);
    }

    fn clear_quality(&self) {
        Self::stop(&self.quality_spinner);
    }

    fn render_quality_options(&self, options: &[FormatOption], selected: Option<&str>, disabled: bool) {
        println!("Available qualities{}:", if disabled { " (locked)" } else { "" });
        for option in options {
            let height = option.height.to_string();
            let marker = if selected == Some(height.as_str()) { "*" } else { " " };
            println!("  {} {:>5}  {}", marker, height, option.resolution_label);
        }
    }
}
