//! Stateful builder form.
//!
//! Mirrors the interactive form: a base URL, one source, one medium from
//! that source, and optional free-text fields. Interactions report
//! analytics events through a [`Tracker`].

use std::sync::Arc;

use serde_json::{json, Value};
use tag_events::{into_params, iso_timestamp, Clock, SystemClock, Tracker};

use crate::taxonomy::{find_source, Medium, Source};
use crate::url::{is_valid_base_url, tag, GeneratedUrl, UtmParams};
use crate::UtmError;

/// Destination for copied URLs.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// In-memory clipboard holding the last copied text.
impl Clipboard for String {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

/// Builder form state with the once-only event flags.
pub struct UtmBuilder {
    base_url: String,
    source: Option<&'static Source>,
    medium: Option<&'static Medium>,
    campaign: String,
    content: String,
    term: String,
    has_started_typing: bool,
    has_copied: bool,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for UtmBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtmBuilder")
            .field("base_url", &self.base_url)
            .field("source", &self.source.map(|s| s.key))
            .field("medium", &self.medium.map(|m| m.value))
            .field("campaign", &self.campaign)
            .field("has_started_typing", &self.has_started_typing)
            .field("has_copied", &self.has_copied)
            .finish_non_exhaustive()
    }
}

impl Default for UtmBuilder {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl UtmBuilder {
    /// Creates an empty form timestamping events with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            base_url: String::new(),
            source: None,
            medium: None,
            campaign: String::new(),
            content: String::new(),
            term: String::new(),
            has_started_typing: false,
            has_copied: false,
            clock,
        }
    }

    fn timestamp(&self) -> Value {
        Value::String(iso_timestamp(&self.clock.now()))
    }

    /// Announces the form. Emits `utm_builder_loaded`.
    pub fn load(&self, tracker: &mut impl Tracker) {
        tracker.track(
            "utm_builder_loaded",
            into_params(json!({ "timestamp": self.timestamp() })),
        );
    }

    /// Stores the base URL and returns whether it is usable.
    ///
    /// The first input since load or reset emits `utmgeneration_start`.
    pub fn input_base_url(&mut self, value: &str, tracker: &mut impl Tracker) -> bool {
        self.base_url = value.trim().to_string();
        if !self.has_started_typing {
            self.has_started_typing = true;
            tracker.track(
                "utmgeneration_start",
                into_params(json!({ "timestamp": self.timestamp() })),
            );
            tracing::debug!("UTM generation started");
        }
        is_valid_base_url(&self.base_url)
    }

    /// Picks a source and clears the medium. Emits `utm_source_selected`.
    pub fn select_source(
        &mut self,
        key: &str,
        tracker: &mut impl Tracker,
    ) -> Result<&'static Source, UtmError> {
        let source = find_source(key).ok_or_else(|| UtmError::UnknownSource(key.to_string()))?;
        self.source = Some(source);
        self.medium = None;
        tracker.track(
            "utm_source_selected",
            into_params(json!({ "utm_source": source.key })),
        );
        Ok(source)
    }

    /// Picks a medium of the current source. Emits `utm_medium_selected`.
    pub fn select_medium(
        &mut self,
        value: &str,
        tracker: &mut impl Tracker,
    ) -> Result<&'static Medium, UtmError> {
        let source = self.source.ok_or(UtmError::NoSource)?;
        let medium = source.medium(value).ok_or_else(|| UtmError::UnknownMedium {
            source_key: source.key.to_string(),
            medium: value.to_string(),
        })?;
        self.medium = Some(medium);
        tracker.track(
            "utm_medium_selected",
            into_params(json!({ "utm_medium": medium.value })),
        );
        Ok(medium)
    }

    /// Sets the raw campaign text.
    pub fn set_campaign(&mut self, value: &str) {
        self.campaign = value.to_string();
    }

    /// Sets the raw content text.
    pub fn set_content(&mut self, value: &str) {
        self.content = value.to_string();
    }

    /// Sets the raw term text.
    pub fn set_term(&mut self, value: &str) {
        self.term = value.to_string();
    }

    /// Currently selected source.
    pub fn source(&self) -> Option<&'static Source> {
        self.source
    }

    /// Currently selected medium, cleared on every source change.
    pub fn medium(&self) -> Option<&'static Medium> {
        self.medium
    }

    fn params(&self) -> UtmParams {
        UtmParams {
            source: self.source.map(|s| s.key.to_string()).unwrap_or_default(),
            medium: self.medium.map(|m| m.value.to_string()).unwrap_or_default(),
            campaign: self.campaign.clone(),
            content: self.content.clone(),
            term: self.term.clone(),
        }
    }

    /// Builds the tagged URL from the current state.
    pub fn generate(&self) -> Result<GeneratedUrl, UtmError> {
        if !is_valid_base_url(&self.base_url) {
            return Err(UtmError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(tag(&self.base_url, &self.params()))
    }

    /// Copies the tagged URL to `clipboard` and returns it.
    ///
    /// The first successful copy since load or reset emits
    /// `utmgeneration_completed`. A failed write emits nothing and leaves
    /// the form ready for another attempt.
    pub fn copy(
        &mut self,
        clipboard: &mut impl Clipboard,
        tracker: &mut impl Tracker,
    ) -> Result<String, UtmError> {
        let generated = self.generate()?;
        if generated.is_untagged() {
            return Err(UtmError::NothingToCopy);
        }
        clipboard
            .write_text(&generated.url)
            .map_err(UtmError::Clipboard)?;

        if !self.has_copied {
            self.has_copied = true;
            let params = self.params();
            tracker.track(
                "utmgeneration_completed",
                into_params(json!({
                    "generated_url": generated.url,
                    "utm_source": params.source,
                    "utm_medium": params.medium,
                    "utm_campaign": non_empty(&self.campaign),
                    "utm_content": non_empty(&self.content),
                    "utm_term": non_empty(&self.term),
                    "timestamp": self.timestamp(),
                })),
            );
            tracing::info!(url = %generated.url, "tagged URL copied");
        }
        Ok(generated.url)
    }

    /// Clears every field and the once-only flags. Emits `utm_builder_reset`.
    pub fn reset(&mut self, tracker: &mut impl Tracker) {
        self.base_url.clear();
        self.source = None;
        self.medium = None;
        self.campaign.clear();
        self.content.clear();
        self.term.clear();
        self.has_started_typing = false;
        self.has_copied = false;
        tracker.track(
            "utm_builder_reset",
            into_params(json!({ "timestamp": self.timestamp() })),
        );
    }
}

fn non_empty(value: &str) -> Value {
    match value.trim() {
        "" => Value::Null,
        trimmed => Value::String(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tag_events::{ManualClock, Params};

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), String> {
            Err("permission denied".to_string())
        }
    }

    fn builder() -> UtmBuilder {
        let clock = ManualClock::at("2024-05-01T10:00:00Z").unwrap();
        UtmBuilder::new(Arc::new(clock))
    }

    fn names(recorded: &[(String, Params)]) -> Vec<&str> {
        recorded.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_generation_start_once() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        assert!(!b.input_base_url("https://", &mut rec));
        assert!(b.input_base_url("https://shop.example", &mut rec));
        assert_eq!(names(&rec), vec!["utmgeneration_start"]);
        assert_eq!(rec[0].1["timestamp"], "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_source_change_clears_medium() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        b.select_source("social", &mut rec).unwrap();
        b.select_medium("instagram", &mut rec).unwrap();
        b.select_source("email", &mut rec).unwrap();
        assert!(b.medium().is_none());
        assert_eq!(
            b.select_medium("instagram", &mut rec),
            Err(UtmError::UnknownMedium {
                source_key: "email".into(),
                medium: "instagram".into()
            })
        );
        assert_eq!(
            names(&rec),
            vec!["utm_source_selected", "utm_medium_selected", "utm_source_selected"]
        );
    }

    #[test]
    fn test_unknown_medium_message() {
        let err = UtmError::UnknownMedium {
            source_key: "email".into(),
            medium: "tiktok".into(),
        };
        assert_eq!(
            err.to_string(),
            "medium 'tiktok' is not available for source 'email'"
        );
        let as_error: &dyn std::error::Error = &err;
        assert!(as_error.source().is_none());
    }

    #[test]
    fn test_selection_errors() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        assert_eq!(b.select_medium("cpc", &mut rec), Err(UtmError::NoSource));
        assert_eq!(
            b.select_source("billboard", &mut rec),
            Err(UtmError::UnknownSource("billboard".into()))
        );
        assert!(rec.is_empty());
    }

    #[test]
    fn test_generate_requires_base_url() {
        let b = builder();
        assert_eq!(b.generate(), Err(UtmError::InvalidBaseUrl(String::new())));
    }

    #[test]
    fn test_copy_emits_completed_once() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        let mut clipboard = String::new();
        b.input_base_url("https://shop.example/", &mut rec);
        b.select_source("paid", &mut rec).unwrap();
        b.select_medium("cpc", &mut rec).unwrap();
        b.set_campaign("Spring Sale! 2024");

        let url = b.copy(&mut clipboard, &mut rec).unwrap();
        b.copy(&mut clipboard, &mut rec).unwrap();
        assert_eq!(
            url,
            "https://shop.example/?utm_source=paid&utm_medium=cpc&utm_campaign=spring_sale_2024"
        );
        assert_eq!(clipboard, url);

        let completed: Vec<_> = rec
            .iter()
            .filter(|(n, _)| n == "utmgeneration_completed")
            .collect();
        assert_eq!(completed.len(), 1);
        let params = &completed[0].1;
        assert_eq!(params["utm_campaign"], "Spring Sale! 2024");
        assert_eq!(params["utm_content"], Value::Null);
        assert_eq!(params["generated_url"], url.as_str());
    }

    #[test]
    fn test_failed_copy_can_retry() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        b.input_base_url("https://shop.example", &mut rec);
        b.select_source("email", &mut rec).unwrap();

        let err = b.copy(&mut BrokenClipboard, &mut rec).unwrap_err();
        assert_eq!(err, UtmError::Clipboard("permission denied".into()));
        assert!(!names(&rec).contains(&"utmgeneration_completed"));

        let mut clipboard = String::new();
        b.copy(&mut clipboard, &mut rec).unwrap();
        assert!(names(&rec).contains(&"utmgeneration_completed"));
    }

    #[test]
    fn test_untagged_url_is_not_copied() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        let mut clipboard = String::new();
        b.input_base_url("https://shop.example", &mut rec);
        assert_eq!(b.copy(&mut clipboard, &mut rec), Err(UtmError::NothingToCopy));
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_reset_rearms_once_only_events() {
        let mut b = builder();
        let mut rec: Vec<(String, Params)> = Vec::new();
        let mut clipboard = String::new();
        b.input_base_url("https://shop.example", &mut rec);
        b.select_source("social", &mut rec).unwrap();
        b.copy(&mut clipboard, &mut rec).unwrap();
        b.reset(&mut rec);
        assert!(b.source().is_none());
        b.input_base_url("https://other.example", &mut rec);
        b.select_source("social", &mut rec).unwrap();
        b.copy(&mut clipboard, &mut rec).unwrap();

        let starts = names(&rec)
            .into_iter()
            .filter(|n| *n == "utmgeneration_start")
            .count();
        let completions = names(&rec)
            .into_iter()
            .filter(|n| *n == "utmgeneration_completed")
            .count();
        assert_eq!((starts, completions), (2, 2));
        assert!(names(&rec).contains(&"utm_builder_reset"));
    }
}
