//! Sample producer calls for testing.
//!
//! This module provides a ready-made demo shop session for other crates to
//! replay. Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // tag-events = { path = "../tag-events", features = ["test-fixtures"] }
//!
//! use tag_events::fixtures;
//!
//! for (name, params) in fixtures::sample_calls() {
//!     debugger.track(&name, params);
//! }
//! ```

use crate::event::{split_data_layer_record, Params};

/// Returns the sample session, oldest call first.
///
/// Contains 12 calls:
/// - 2 page views
/// - 4 ecommerce events (item list, item view, add to cart, checkout)
/// - 4 engagement events (click, video start, form start, form submit)
/// - 2 custom events (`select_promotion`, `soundcloud_play`)
pub fn sample_calls() -> Vec<(String, Params)> {
    let jsonl = include_str!("../tests/fixtures/sample_events.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let record: Params = serde_json::from_str(l).unwrap_or_else(|e| {
                panic!("Failed to parse fixture line: {}\nError: {}", l, e)
            });
            split_data_layer_record(record)
                .unwrap_or_else(|| panic!("Fixture line has no event name: {}", l))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_calls_load() {
        let calls = sample_calls();
        assert_eq!(calls.len(), 12);
        assert_eq!(calls[0].0, "page_view");
        assert_eq!(calls[11].0, "soundcloud_play");
    }
}
