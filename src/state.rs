use crate::models::{FormatOption, MediaFormat};
use crate::view::StatusKind;

/// Everything one form instance knows between events.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub url_input: String,
    pub format: MediaFormat,
    pub quality_options: Vec<FormatOption>,
    pub selected_quality: Option<String>,
    pub is_downloading: bool,
    pub last_validated_url: Option<String>,
    pub status: Option<StatusKind>,
    pub submit_enabled: bool,
    format_load_token: u64,
    input_generation: u64,
}

impl FormState {
    /// Starts a new format lookup; older lookups become stale.
    pub fn begin_format_load(&mut self) -> u64 {
        self.format_load_token += 1;
        self.quality_options.clear();
        self.selected_quality = None;
        self.format_load_token
    }

    pub fn is_current_format_load(&self, token: u64) -> bool {
        self.format_load_token == token
    }

    /// Drops rendered options and invalidates any lookup still in flight.
    pub fn clear_quality(&mut self) {
        self.format_load_token += 1;
        self.quality_options.clear();
        self.selected_quality = None;
    }

    /// Records new field contents and returns the generation that owns them.
    pub fn record_input(&mut self, raw: &str) -> u64 {
        self.url_input = raw.to_string();
        self.input_generation += 1;
        self.input_generation
    }

    pub fn is_current_input(&self, generation: u64) -> bool {
        self.input_generation == generation
    }

    pub fn trimmed_url(&self) -> String {
        self.url_input.trim().to_string()
    }

    /// Quality sent with a download: the selected one or `fallback`.
    pub fn quality_or(&self, fallback: &str) -> String {
        self.selected_quality
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(height: u32) -> FormatOption {
        FormatOption {
            height,
            resolution_label: format!("{height}p"),
        }
    }

    #[test]
    fn newer_format_load_supersedes_older() {
        let mut state = FormState::default();
        let first = state.begin_format_load();
        let second = state.begin_format_load();
        assert!(!state.is_current_format_load(first));
        assert!(state.is_current_format_load(second));
    }

    #[test]
    fn clearing_quality_invalidates_inflight_load() {
        let mut state = FormState::default();
        let token = state.begin_format_load();
        state.quality_options.push(option(720));
        state.selected_quality = Some("720".into());

        state.clear_quality();

        assert!(!state.is_current_format_load(token));
        assert!(state.quality_options.is_empty());
        assert_eq!(state.quality_or("1080"), "1080");
    }

    #[test]
    fn input_generations_increase() {
        let mut state = FormState::default();
        let a = state.record_input(" youtu.be/x ");
        let b = state.record_input("vimeo.com/1");
        assert!(b > a);
        assert!(state.is_current_input(b));
        assert_eq!(state.trimmed_url(), "vimeo.com/1");
    }

    #[test]
    fn defaults_to_mp3_and_idle() {
        let state = FormState::default();
        assert_eq!(state.format, MediaFormat::Mp3);
        assert!(!state.is_downloading);
        assert!(!state.submit_enabled);
    }
}
