//! Error taxonomy and user-facing translation of backend error text.

use std::time::Duration;
use thiserror::Error;

/// Failures reaching or understanding the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network connection failed: {0}")]
    Transport(String),

    #[error("Network request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Why a submit never reached the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a download is already in progress")]
    Busy,

    #[error("{0}")]
    Invalid(String),
}

/// Keyword groups checked in order against the lowercased message.
const TRANSLATIONS: &[(&[&str], &str)] = &[
    (
        &["truncated", "incomplete"],
        "The video URL appears to be incomplete or corrupted. Please check and try again.",
    ),
    (
        &["404", "not found"],
        "Video not found. The video may have been deleted or the URL is incorrect.",
    ),
    (
        &["403", "forbidden"],
        "Access denied. This video may be private or restricted.",
    ),
    (&["410", "deleted"], "Video has been deleted."),
    (&["unavailable"], "Video is currently unavailable."),
    (&["private"], "This video is private and cannot be accessed."),
    (&["age"], "This video may be age-restricted."),
    (&["geo", "region"], "This video is not available in your region."),
    (&["copyright"], "This video has copyright restrictions."),
    (
        &["network", "connection"],
        "Network error. Please check your connection and try again.",
    ),
    (
        &["ffmpeg"],
        "FFmpeg is required for MP3 downloads. Please ensure FFmpeg is installed.",
    ),
];

/// Maps raw error text to a sentence fit for the status area.
pub fn translate(raw: &str) -> String {
    let lower = raw.to_lowercase();
    TRANSLATIONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, message)| (*message).to_string())
        .unwrap_or_else(|| format!("Unable to process video: {}", raw))
}
