//! Shared analytics event types for the GA4 debugger.
//!
//! This crate contains pure data structures with no capture or rendering
//! logic. It is a dependency for all other crates in the workspace.

pub mod category;
pub mod event;
pub mod timestamp;
pub mod tracker;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export category types
pub use category::{Category, Filter, ParseCategoryError};

// Re-export event types
pub use event::{into_params, split_data_layer_record, CapturedEvent, Counters, EventId, Params};

// Re-export time handling
pub use timestamp::{display_time, export_date, iso_timestamp, Clock, ManualClock, SystemClock};

// Re-export the producer interface
pub use tracker::Tracker;
