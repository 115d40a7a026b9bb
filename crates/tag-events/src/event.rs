//! Captured event records.
//!
//! A [`CapturedEvent`] is created once, at ingest, and never mutated. Its
//! serialized form is the export format: keys in the fixed order
//! `id, timestamp, time, event, type, params`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::category::{Category, Filter};
use crate::timestamp::{display_time, iso_millis};

/// Ordered event parameters, opaque to the store.
pub type Params = Map<String, Value>;

/// Converts a JSON value into event parameters.
///
/// Objects become their key/value map; anything else yields no parameters.
///
/// ```
/// use serde_json::json;
/// use tag_events::into_params;
///
/// let params = into_params(json!({ "value": 10, "currency": "EUR" }));
/// assert_eq!(params.len(), 2);
/// assert!(into_params(json!("not an object")).is_empty());
/// ```
pub fn into_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Splits a queue record `{ "event": name, ...params }` back into its parts.
///
/// Returns `None` if the record has no string `event` key.
pub fn split_data_layer_record(mut record: Params) -> Option<(String, Params)> {
    match record.shift_remove("event") {
        Some(Value::String(name)) => Some((name, record)),
        _ => None,
    }
}

/// Unique identifier of a captured event.
///
/// Formatted as `evt_<unix-millis>_<sequence>`; the sequence part keeps two
/// events captured in the same millisecond apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Builds an id from a capture time in unix milliseconds and a sequence
    /// number.
    pub fn new(unix_millis: i64, sequence: u64) -> Self {
        Self(format!("evt_{}_{:06}", unix_millis, sequence))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An analytics event as captured by the debugger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedEvent {
    /// Unique event identifier
    pub id: EventId,
    /// Capture instant, exported as ISO-8601 UTC
    #[serde(rename = "timestamp", with = "iso_millis")]
    pub captured_at: DateTime<Utc>,
    /// Short local time for list rendering
    #[serde(rename = "time")]
    pub display_time: String,
    /// Producer-supplied event name
    #[serde(rename = "event")]
    pub name: String,
    /// Category frozen at capture time
    #[serde(rename = "type")]
    pub category: Category,
    /// Event parameters in producer order
    #[serde(default)]
    pub params: Params,
}

impl CapturedEvent {
    /// Creates a record captured at `instant`.
    ///
    /// The display time is rendered in the instant's own offset.
    pub fn new(
        id: EventId,
        instant: DateTime<FixedOffset>,
        name: impl Into<String>,
        category: Category,
        params: Params,
    ) -> Self {
        Self {
            id,
            captured_at: instant.with_timezone(&Utc),
            display_time: display_time(&instant),
            name: name.into(),
            category,
            params,
        }
    }

    /// Returns the ISO-8601 capture timestamp.
    pub fn timestamp(&self) -> String {
        self.captured_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    /// Returns true if this event passes the given filter.
    pub fn matches(&self, filter: Filter) -> bool {
        filter.matches(self.category)
    }

    /// Builds the flat record pushed to the tag-management queue.
    ///
    /// Parameters are written after the `event` key, so a parameter named
    /// `event` replaces the name.
    pub fn data_layer_record(&self) -> Params {
        let mut record = Params::new();
        record.insert("event".to_string(), Value::String(self.name.clone()));
        for (key, value) in &self.params {
            record.insert(key.clone(), value.clone());
        }
        record
    }

    /// Serializes to pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Running aggregate counters over the captured history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Every captured event
    pub total: u64,
    /// Events in the `page` category
    #[serde(rename = "pageViews")]
    pub page_views: u64,
    /// Events in the `ecommerce` category
    #[serde(rename = "ecommerce")]
    pub ecommerce_events: u64,
}

impl Counters {
    /// Counts one event of the given category.
    pub fn record(&mut self, category: Category) {
        self.total += 1;
        match category {
            Category::Page => self.page_views += 1,
            Category::Ecommerce => self.ecommerce_events += 1,
            Category::Engagement | Category::Custom => {}
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> CapturedEvent {
        let instant = DateTime::parse_from_rfc3339("2024-05-01T11:30:00.250+02:00").unwrap();
        CapturedEvent::new(
            EventId::new(1714555800250, 7),
            instant,
            "add_to_cart",
            Category::Ecommerce,
            into_params(json!({ "currency": "EUR", "value": 10 })),
        )
    }

    #[test]
    fn test_event_id_format() {
        assert_eq!(EventId::new(1714555800250, 7).as_str(), "evt_1714555800250_000007");
        assert_ne!(EventId::new(1, 1), EventId::new(1, 2));
    }

    #[test]
    fn test_export_key_order() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"evt_1714555800250_000007","timestamp":"2024-05-01T09:30:00.250Z","time":"11:30:00.25","event":"add_to_cart","type":"ecommerce","params":{"currency":"EUR","value":10}}"#
        );
    }

    #[test]
    fn test_params_keep_producer_order() {
        let params = into_params(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_deserialize_export_record() {
        let json = serde_json::to_string(&sample_event()).unwrap();
        let parsed: CapturedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample_event());
        assert_eq!(parsed.timestamp(), "2024-05-01T09:30:00.250Z");
    }

    #[test]
    fn test_data_layer_record_shape() {
        let record = sample_event().data_layer_record();
        assert_eq!(
            Value::Object(record),
            json!({ "event": "add_to_cart", "currency": "EUR", "value": 10 })
        );
    }

    #[test]
    fn test_data_layer_record_param_overrides_name() {
        let mut event = sample_event();
        event.params.insert("event".to_string(), json!("renamed"));
        let record = event.data_layer_record();
        assert_eq!(record["event"], json!("renamed"));
        assert_eq!(record.keys().next().map(String::as_str), Some("event"));
    }

    #[test]
    fn test_split_data_layer_record() {
        let record = into_params(json!({ "event": "click", "click_element": "hero_cta" }));
        let (name, params) = split_data_layer_record(record).unwrap();
        assert_eq!(name, "click");
        assert_eq!(params["click_element"], json!("hero_cta"));
        assert!(split_data_layer_record(into_params(json!({ "event": 5 }))).is_none());
    }

    #[test]
    fn test_split_keeps_param_order() {
        let record = into_params(json!({
            "event": "soundcloud_play",
            "track_name": "Night Drive",
            "position": 12,
            "timestamp": 12,
        }));
        let (_, params) = split_data_layer_record(record).unwrap();
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["track_name", "position", "timestamp"]);
    }

    #[test]
    fn test_counters_record() {
        let mut counters = Counters::default();
        counters.record(Category::Page);
        counters.record(Category::Ecommerce);
        counters.record(Category::Engagement);
        counters.record(Category::Custom);
        assert_eq!(
            counters,
            Counters {
                total: 4,
                page_views: 1,
                ecommerce_events: 1
            }
        );
        counters.reset();
        assert_eq!(counters, Counters::default());
    }

    #[test]
    fn test_counters_serialization() {
        let counters = Counters {
            total: 3,
            page_views: 1,
            ecommerce_events: 1,
        };
        assert_eq!(
            serde_json::to_string(&counters).unwrap(),
            r#"{"total":3,"pageViews":1,"ecommerce":1}"#
        );
    }
}
