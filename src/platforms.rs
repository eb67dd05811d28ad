//! Supported video platforms.
//!
//! The table is ordered: validation walks it front to back and the first
//! platform whose domain appears in the hostname decides the outcome.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct PlatformSpec {
    /// Lowercase key used in messages ("youtube").
    pub name: &'static str,
    /// Name shown in the supported-platforms list ("YouTube").
    pub display_name: &'static str,
    pub domains: Vec<&'static str>,
    pub patterns: Vec<Regex>,
    /// Capturing pattern for the video identifier; the last participating group wins.
    pub id_pattern: Option<Regex>,
    pub min_id_length: usize,
}

impl PlatformSpec {
    pub fn new(
        name: &'static str,
        display_name: &'static str,
        domains: &[&'static str],
        patterns: &[&str],
        id_pattern: Option<&str>,
        min_id_length: usize,
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let id_pattern = id_pattern.map(Regex::new).transpose()?;

        Ok(Self {
            name,
            display_name,
            domains: domains.to_vec(),
            patterns,
            id_pattern,
            min_id_length,
        })
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| host.contains(domain))
    }

    pub fn matches_url(&self, url: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(url))
    }
}

fn build_registry() -> Result<Vec<PlatformSpec>, regex::Error> {
    Ok(vec![
        PlatformSpec::new(
            "youtube",
            "YouTube",
            &["youtube.com", "youtu.be"],
            &[r"(?:youtube\.com/watch\?v=|youtu\.be/)[\w-]+"],
            Some(r"(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]+)"),
            11,
        )?,
        PlatformSpec::new(
            "instagram",
            "Instagram",
            &["instagram.com"],
            &[r"instagram\.com/(p|reel|tv)/[\w-]+"],
            Some(r"instagram\.com/(p|reel|tv)/([a-zA-Z0-9_-]+)"),
            10,
        )?,
        PlatformSpec::new(
            "facebook",
            "Facebook",
            &["facebook.com"],
            &[r"facebook\.com/.+/videos?/"],
            Some(r"facebook\.com/.+/videos?/(\d+)"),
            5,
        )?,
        PlatformSpec::new(
            "tiktok",
            "TikTok",
            &["tiktok.com"],
            &[r"tiktok\.com/@.+/video/\d+"],
            Some(r"tiktok\.com/@.+/video/(\d+)"),
            5,
        )?,
        PlatformSpec::new(
            "twitter",
            "Twitter",
            &["twitter.com", "x.com"],
            &[r"(?:twitter\.com|x\.com)/.+/status/\d+"],
            Some(r"(?:twitter\.com|x\.com)/.+/status/(\d+)"),
            5,
        )?,
        PlatformSpec::new(
            "twitch",
            "Twitch",
            &["twitch.tv"],
            &[r"twitch\.tv/videos/\d+|twitch\.tv/.+/clip/"],
            Some(r"(?:twitch\.tv/videos/|twitch\.tv/.+/clip/)([\w-]+)"),
            5,
        )?,
        PlatformSpec::new(
            "vimeo",
            "Vimeo",
            &["vimeo.com"],
            &[r"vimeo\.com/\d+"],
            Some(r"vimeo\.com/(\d+)"),
            5,
        )?,
        PlatformSpec::new(
            "dailymotion",
            "DailyMotion",
            &["dailymotion.com"],
            &[r"dailymotion\.com/video/[\w-]+"],
            Some(r"dailymotion\.com/video/([\w-]+)"),
            5,
        )?,
        PlatformSpec::new(
            "pinterest",
            "Pinterest",
            &["pinterest.com"],
            &[r"pinterest\.com/pin/\d+"],
            Some(r"pinterest\.com/pin/(\d+)"),
            10,
        )?,
        PlatformSpec::new(
            "reddit",
            "Reddit",
            &["reddit.com"],
            &[r"reddit\.com/r/.+/comments/"],
            Some(r"reddit\.com/r/.+/comments/(\w+)"),
            5,
        )?,
    ])
}

/// The ten supported platforms in matching order.
pub fn registry() -> &'static [PlatformSpec] {
    static REGISTRY: OnceLock<Vec<PlatformSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| build_registry().expect("failed to compile platform patterns"))
}

/// Comma separated display names, in registry order.
pub fn supported_names(registry: &[PlatformSpec]) -> String {
    registry
        .iter()
        .map(|p| p.display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn find(name: &str) -> Option<&'static PlatformSpec> {
    registry().iter().find(|p| p.name == name)
}
