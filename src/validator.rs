//! URL validation against the platform registry.
//!
//! Matching is heuristic: a hostname that merely contains a supported domain
//! (`notyoutube.com.evil.com`) is accepted here. The backend is the final judge.

use tracing::debug;
use url::Url;

use crate::models::ValidationResult;
use crate::platforms::{self, PlatformSpec};

pub const EMPTY_INPUT: &str = "Please enter a valid URL";
pub const MALFORMED_INPUT: &str = "Invalid URL format. Please enter a valid video link";
pub const BAD_VIDEO_ID: &str = "Invalid video ID. The URL appears to be incomplete or corrupted.";

pub fn validate_format(raw: &str) -> ValidationResult {
    validate_with(platforms::registry(), raw)
}

pub fn validate_with(registry: &[PlatformSpec], raw: &str) -> ValidationResult {
    let input = raw.trim();
    if input.is_empty() {
        return ValidationResult::invalid(EMPTY_INPUT);
    }

    let Some(parsed) = normalize(input) else {
        return ValidationResult::invalid(MALFORMED_INPUT);
    };
    let Some(host) = parsed.host_str() else {
        return ValidationResult::invalid(MALFORMED_INPUT);
    };
    let full_url = parsed.as_str();

    let Some(platform) = registry.iter().find(|p| p.matches_host(host)) else {
        return ValidationResult::invalid(format!(
            "Unsupported platform. Supported: {}",
            platforms::supported_names(registry)
        ));
    };

    if !platform.matches_url(full_url) {
        return ValidationResult::invalid(format!(
            "Invalid {} URL. Make sure it's a direct link to the video.",
            platform.name
        ));
    }

    match extract_identifier(full_url, platform) {
        Some(id) if id.len() >= platform.min_id_length => {
            debug!(platform = platform.name, id = %id, "URL accepted");
            ValidationResult::valid(platform, full_url.to_string(), id)
        }
        _ => ValidationResult::invalid(BAD_VIDEO_ID),
    }
}

/// Returns the last participating capture of the platform's id pattern.
pub fn extract_identifier(url: &str, platform: &PlatformSpec) -> Option<String> {
    let captures = platform.id_pattern.as_ref()?.captures(url)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .last()
        .map(|m| m.as_str().to_string())
}

fn normalize(input: &str) -> Option<Url> {
    let lower = input.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    Url::parse(&candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(url: &str, platform: &str, id: &str) {
        match validate_format(url) {
            ValidationResult::Valid {
                platform: p,
                video_id,
                ..
            } => {
                assert_eq!(p, platform, "{url}");
                assert_eq!(video_id, id, "{url}");
            }
            other => panic!("expected {url} to be valid, got {other:?}"),
        }
    }

    fn reason(url: &str) -> String {
        match validate_format(url) {
            ValidationResult::Invalid { reason } => reason,
            other => panic!("expected {url} to be invalid, got {other:?}"),
        }
    }

    #[test]
    fn accepts_every_platform_with_long_enough_id() {
        assert_valid("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "youtube", "dQw4w9WgXcQ");
        assert_valid("https://youtu.be/dQw4w9WgXcQ", "youtube", "dQw4w9WgXcQ");
        assert_valid("https://www.instagram.com/reel/Cx1234567890/", "instagram", "Cx1234567890");
        assert_valid(
            "https://www.facebook.com/someuser/videos/1234567890/",
            "facebook",
            "1234567890",
        );
        assert_valid(
            "https://www.tiktok.com/@someone/video/7234567890123456789",
            "tiktok",
            "7234567890123456789",
        );
        assert_valid("https://x.com/someone/status/1700000000000", "twitter", "1700000000000");
        assert_valid("https://www.twitch.tv/videos/1987654321", "twitch", "1987654321");
        assert_valid(
            "https://www.twitch.tv/streamer/clip/FunnyClipSlug-abc",
            "twitch",
            "FunnyClipSlug-abc",
        );
        assert_valid("https://vimeo.com/76979871", "vimeo", "76979871");
        assert_valid("https://www.dailymotion.com/video/x8abcd1", "dailymotion", "x8abcd1");
        assert_valid("https://www.pinterest.com/pin/1234567890123/", "pinterest", "1234567890123");
        assert_valid(
            "https://www.reddit.com/r/videos/comments/abc123/some_title/",
            "reddit",
            "abc123",
        );
    }

    #[test]
    fn rejects_short_ids() {
        assert_eq!(reason("https://youtube.com/watch?v=short"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.instagram.com/p/abc/"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.facebook.com/u/videos/1234/"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.tiktok.com/@a/video/1234"), BAD_VIDEO_ID);
        assert_eq!(reason("https://twitter.com/a/status/1234"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.twitch.tv/videos/1234"), BAD_VIDEO_ID);
        assert_eq!(reason("https://vimeo.com/1234"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.dailymotion.com/video/x8a"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.pinterest.com/pin/123456789/"), BAD_VIDEO_ID);
        assert_eq!(reason("https://www.reddit.com/r/videos/comments/ab1/t/"), BAD_VIDEO_ID);
    }

    #[test]
    fn empty_and_whitespace_input() {
        assert_eq!(reason(""), EMPTY_INPUT);
        assert_eq!(reason("   \t "), EMPTY_INPUT);
    }

    #[test]
    fn unsupported_platform_lists_all_names() {
        let message = reason("https://example.com/video/123");
        assert_eq!(
            message,
            "Unsupported platform. Supported: YouTube, Instagram, Facebook, TikTok, Twitter, Twitch, Vimeo, DailyMotion, Pinterest, Reddit"
        );
    }

    #[test]
    fn wrong_path_on_known_domain() {
        assert_eq!(
            reason("https://www.youtube.com/feed/trending"),
            "Invalid youtube URL. Make sure it's a direct link to the video."
        );
    }

    #[test]
    fn scheme_is_optional() {
        assert_valid("youtube.com/watch?v=dQw4w9WgXcQ", "youtube", "dQw4w9WgXcQ");
        assert_valid("HTTPS://vimeo.com/76979871", "vimeo", "76979871");
    }

    #[test]
    fn malformed_input() {
        assert_eq!(reason("not a url at all"), MALFORMED_INPUT);
        assert_eq!(reason("https://"), MALFORMED_INPUT);
    }

    #[test]
    fn hostile_host_containing_domain_is_accepted() {
        assert_valid(
            "https://notyoutube.com.evil.com/watch?v=dQw4w9WgXcQ",
            "youtube",
            "dQw4w9WgXcQ",
        );
    }

    #[test]
    fn platform_without_id_pattern_always_fails() {
        let registry = vec![
            PlatformSpec::new(
                "clips",
                "Clips",
                &["clips.example"],
                &[r"clips\.example/v/\w+"],
                None,
                1,
            )
            .unwrap(),
        ];
        match validate_with(&registry, "https://clips.example/v/abcdef") {
            ValidationResult::Invalid { reason } => assert_eq!(reason, BAD_VIDEO_ID),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn extract_identifier_takes_last_group() {
        let instagram = platforms::find("instagram").unwrap();
        assert_eq!(
            extract_identifier("https://instagram.com/tv/AbCdEfGhIj", instagram).as_deref(),
            Some("AbCdEfGhIj")
        );
        let vimeo = platforms::find("vimeo").unwrap();
        assert_eq!(extract_identifier("https://vimeo.com/channels", vimeo), None);
    }
}
