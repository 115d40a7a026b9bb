//! GA4 event debugger: capture, classification and panel rendering.
//!
//! The debugger sits between instrumented page elements and the
//! tag-management queue. It captures every `(name, params)` pair producers
//! push, classifies it, keeps the history and counters, forwards the record
//! to the queue, and maintains a bounded, filterable panel of what happened.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  track(name, params)  ┌──────────┐  publish   ┌───────────┐
//! │ producers │ ────────────────────▶ │ debugger │ ─────────▶ │ dataLayer │
//! └───────────┘                       └──────────┘            └───────────┘
//!                                          │
//!                                          ▼
//!                                     EventPanel
//! ```
//!
//! # Modules
//!
//! - [`classifier`]: Ordered substring rules mapping names to categories
//! - [`store`]: Newest-first history, counters and active filter
//! - [`sink`]: Outbound queue implementations
//! - [`render`]: Panel view model and the render coordinator
//! - [`export`]: Snapshot serialization and export targets
//! - [`session`]: Single-threaded command dispatcher for async producers

pub mod classifier;
pub mod config;
pub mod export;
pub mod render;
pub mod session;
pub mod sink;
pub mod store;

// Re-export classifier types
pub use classifier::{classify, ClassifierError, ClassifierRule, EventClassifier};

// Re-export config types
pub use config::{
    default_config_toml, ClassifierConfig, ConfigError, DebuggerConfig, ExportConfig, RenderConfig,
};

// Re-export export types
pub use export::{export_file_name, read_export, DirectoryTarget, ExportError, ExportFile, ExportTarget};

// Re-export render types
pub use render::{
    DetailPanel, EventPanel, EventRow, Notification, NotificationKind, ParamPreview, Placeholder,
    RenderCoordinator,
};

// Re-export session types
pub use session::{Command, Session, SessionHandle};

// Re-export sink types
pub use sink::{DataLayer, EventSink, JsonlSink, NullSink, SinkError};

// Re-export store
pub use store::EventStore;

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tag_events::{
    export_date, iso_timestamp, CapturedEvent, Clock, EventId, Filter, Params, SystemClock,
    Tracker,
};

/// Errors that can occur in debugger operations.
#[derive(Debug, thiserror::Error)]
pub enum DebuggerError {
    /// Error loading configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Invalid classification rules
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    /// Error exporting the history
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// The debugger panel with its store, sink and export target.
///
/// Owns all process-wide capture state; producers reach it only through
/// [`Tracker`].
pub struct Debugger {
    store: EventStore,
    sink: Box<dyn EventSink>,
    coordinator: RenderCoordinator,
    export_target: Box<dyn ExportTarget>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Debugger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debugger")
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl Debugger {
    /// Creates a debugger publishing to `sink`.
    ///
    /// Pushes a `debugger_loaded` record straight to the sink; it is not
    /// captured in the history.
    pub fn new(
        config: DebuggerConfig,
        sink: Box<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DebuggerError> {
        let classifier = EventClassifier::from_rules(config.classifier.rules)?;
        Ok(Self::from_parts(
            classifier,
            config.render,
            config.export,
            sink,
            clock,
        ))
    }

    /// Creates a debugger from a configuration file.
    pub fn from_config_file(
        path: &Path,
        sink: Box<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DebuggerError> {
        let config = DebuggerConfig::from_file(path)?;
        Self::new(config, sink, clock)
    }

    /// Creates a debugger with default configuration, the wall clock, and the
    /// given sink.
    pub fn with_sink(sink: Box<dyn EventSink>) -> Self {
        Self::from_parts(
            EventClassifier::default(),
            RenderConfig::default(),
            ExportConfig::default(),
            sink,
            Arc::new(SystemClock),
        )
    }

    fn from_parts(
        classifier: EventClassifier,
        render: RenderConfig,
        export: ExportConfig,
        mut sink: Box<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut loaded = Params::new();
        loaded.insert("event".to_string(), Value::from("debugger_loaded"));
        loaded.insert("timestamp".to_string(), Value::from(iso_timestamp(&clock.now())));
        if let Err(e) = sink.publish(&loaded) {
            tracing::warn!("Failed to announce debugger: {}", e);
        }

        Self {
            store: EventStore::new(classifier, Box::new(Arc::clone(&clock))),
            sink,
            coordinator: RenderCoordinator::new(render, export.file_prefix),
            export_target: Box::new(DirectoryTarget::new(export.directory)),
            clock,
        }
    }

    /// Replaces where exports are saved.
    pub fn with_export_target(mut self, target: Box<dyn ExportTarget>) -> Self {
        self.export_target = target;
        self
    }

    /// Captures an event, forwards it to the sink and updates the panel.
    ///
    /// Sink failures are logged and otherwise ignored.
    pub fn capture(&mut self, name: &str, params: Params) -> CapturedEvent {
        let event = self.store.ingest(name, params);

        if let Err(e) = self.sink.publish(&event.data_layer_record()) {
            tracing::warn!(event = %event.name, "Failed to publish event: {}", e);
        }

        self.coordinator.on_event_captured(&event, &self.store);
        event
    }

    /// Applies a filter token; unknown tokens select `all`.
    pub fn set_filter(&mut self, token: &str) -> Filter {
        let filter = Filter::parse_lossy(token);
        if filter == Filter::All && !token.trim().eq_ignore_ascii_case("all") {
            tracing::debug!("Unknown filter token {:?}, showing all events", token);
        }
        self.apply_filter(filter);
        filter
    }

    /// Applies a parsed filter.
    pub fn apply_filter(&mut self, filter: Filter) {
        self.coordinator.on_filter_changed(filter, &mut self.store);
    }

    /// Clears history, counters and the visible list.
    pub fn clear(&mut self) {
        self.coordinator.on_clear_requested(&mut self.store);
    }

    /// Opens the detail panel for an event. Returns false if the id is not in
    /// the history.
    pub fn show_detail(&mut self, id: &EventId) -> bool {
        match self.store.get(id) {
            Some(event) => {
                self.coordinator.on_detail_requested(event);
                true
            }
            None => false,
        }
    }

    /// Closes the detail panel.
    pub fn close_detail(&mut self) {
        self.coordinator.close_detail();
    }

    /// Exports the full history, dated with today's UTC date.
    pub fn export(&mut self) -> Result<PathBuf, DebuggerError> {
        let today = export_date(&self.clock.now());
        let path = self.coordinator.on_export_requested(
            &self.store,
            self.export_target.as_mut(),
            today,
        )?;
        Ok(path)
    }

    /// Clears the current notification.
    pub fn dismiss_notification(&mut self) {
        self.coordinator.dismiss_notification();
    }

    /// Returns the panel view model.
    pub fn panel(&self) -> &EventPanel {
        self.coordinator.panel()
    }

    /// Returns the event store.
    pub fn store(&self) -> &EventStore {
        &self.store
    }
}

impl Tracker for Debugger {
    fn track(&mut self, name: &str, params: Params) {
        self.capture(name, params);
    }
}
