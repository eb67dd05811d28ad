use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::platforms::PlatformSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid {
        platform: &'static str,
        normalized_url: String,
        video_id: String,
    },
    Invalid {
        reason: String,
    },
}

impl ValidationResult {
    pub(crate) fn valid(platform: &PlatformSpec, normalized_url: String, video_id: String) -> Self {
        Self::Valid {
            platform: platform.name,
            normalized_url,
            video_id,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// User-facing line for the status area.
    pub fn message(&self) -> String {
        match self {
            Self::Valid { platform, .. } => format!("Valid {} URL detected", platform),
            Self::Invalid { reason } => reason.clone(),
        }
    }
}

/// Output container the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    #[default]
    Mp3,
    Mp4,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            MediaFormat::Mp3 => MediaFormat::Mp4,
            MediaFormat::Mp4 => MediaFormat::Mp3,
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOption {
    pub height: u32,
    #[serde(rename = "resolution")]
    pub resolution_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub format: MediaFormat,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success {
        title: String,
        filepath: String,
        filename: String,
    },
    Failure {
        raw_error_message: String,
    },
}

/// Body of `POST /get-formats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatsReply {
    #[serde(default)]
    pub formats: Option<Vec<FormatOption>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /download`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filepath: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A decoded backend response together with its HTTP status.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub status: u16,
    pub body: T,
}

impl<T> Reply<T> {
    pub fn ok(body: T) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Link the saver follows to fetch the produced file, relative to the server root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveLink {
    pub href: String,
    pub filename: String,
}

impl SaveLink {
    pub fn for_file(filepath: &str, filename: &str) -> Self {
        Self {
            href: format!("/get-file/{}", filepath.trim_start_matches('/')),
            filename: filename.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_request_uses_lowercase_format() {
        let request = DownloadRequest {
            url: "https://vimeo.com/123456".to_string(),
            format: MediaFormat::Mp4,
            quality: "720".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["format"], "mp4");
        assert_eq!(json["quality"], "720");
    }

    #[test]
    fn formats_reply_reads_resolution_label_and_ignores_width() {
        let reply: FormatsReply = serde_json::from_str(
            r#"{"formats":[{"height":1080,"width":1920,"resolution":"1080p"}]}"#,
        )
        .unwrap();
        let formats = reply.formats.unwrap();
        assert_eq!(formats[0].height, 1080);
        assert_eq!(formats[0].resolution_label, "1080p");
        assert!(reply.error.is_none());
    }

    #[test]
    fn download_reply_defaults_missing_success_to_false() {
        let reply: DownloadReply = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("boom"));
    }

    #[test]
    fn save_link_points_at_get_file() {
        let link = SaveLink::for_file("a/b.mp4", "b.mp4");
        assert_eq!(link.href, "/get-file/a/b.mp4");
        assert_eq!(link.filename, "b.mp4");
    }
}
