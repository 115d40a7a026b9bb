//! Debugger panel rendering.
//!
//! The [`RenderCoordinator`] keeps a toolkit-independent view model, the
//! [`EventPanel`], consistent with the [`EventStore`]. Captured events are
//! patched in incrementally at the head of the list; filter changes and
//! clears rebuild the list from store state.
//!
//! The visible list is capped (100 rows by default). The cap only bounds what
//! is rendered: dropping a row never touches the store history.

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use tag_events::{CapturedEvent, Category, Counters, EventId, Filter};

use crate::config::RenderConfig;
use crate::export::{ExportError, ExportFile, ExportTarget};
use crate::store::EventStore;

/// One parameter shown in a compact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPreview {
    pub key: String,
    /// Stringified, possibly truncated value
    pub value: String,
}

/// Compact list row for one captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    /// Event the row opens in the detail panel
    pub event_id: EventId,
    pub name: String,
    pub time: String,
    /// Drives the colored indicator
    pub category: Category,
    /// First few parameters
    pub preview: Vec<ParamPreview>,
}

impl EventRow {
    /// Builds a row, clipping the parameter preview per `config`.
    pub fn from_event(event: &CapturedEvent, config: &RenderConfig) -> Self {
        let preview = event
            .params
            .iter()
            .take(config.preview_params)
            .map(|(key, value)| ParamPreview {
                key: key.clone(),
                value: truncate(&value_text(value), config.preview_value_len),
            })
            .collect();

        Self {
            event_id: event.id.clone(),
            name: event.name.clone(),
            time: event.display_time.clone(),
            category: event.category,
            preview,
        }
    }
}

/// Renders a parameter value the way the compact row shows it.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keeps the first `max_chars` characters, marking the cut with `...`.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Shown instead of an empty list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing captured yet, or just cleared
    Waiting,
    /// Events exist but none pass the filter
    NoMatches,
}

impl Placeholder {
    /// Returns the placeholder message.
    pub fn message(self) -> &'static str {
        match self {
            Placeholder::Waiting => "Waiting for events... interact with the demo site",
            Placeholder::NoMatches => "No events for this filter",
        }
    }
}

/// Full record opened from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub event_id: EventId,
    /// Indented JSON of the whole record
    pub json: String,
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Transient, non-blocking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Everything the debugger panel displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPanel {
    rows: VecDeque<EventRow>,
    placeholder: Option<Placeholder>,
    counters: Counters,
    filter: Filter,
    detail: Option<DetailPanel>,
    notification: Option<Notification>,
}

impl Default for EventPanel {
    fn default() -> Self {
        Self {
            rows: VecDeque::new(),
            placeholder: Some(Placeholder::Waiting),
            counters: Counters::default(),
            filter: Filter::All,
            detail: None,
            notification: None,
        }
    }
}

impl EventPanel {
    /// Visible rows, newest first.
    pub fn rows(&self) -> impl Iterator<Item = &EventRow> {
        self.rows.iter()
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Placeholder shown instead of rows, if any.
    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder
    }

    /// Counters as displayed.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Filter the list was built with.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Open detail panel, if any.
    pub fn detail(&self) -> Option<&DetailPanel> {
        self.detail.as_ref()
    }

    /// Current notification, if any.
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }
}

impl fmt::Display for EventPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Events: {} | Page views: {} | Ecommerce: {} | Filter: {}",
            self.counters.total, self.counters.page_views, self.counters.ecommerce_events, self.filter
        )?;

        if let Some(placeholder) = self.placeholder {
            writeln!(f, "  {}", placeholder.message())?;
        }

        for row in &self.rows {
            write!(f, "  [{:<10}] {} {}", row.category, row.time, row.name)?;
            for param in &row.preview {
                write!(f, "  {}: {}", param.key, param.value)?;
            }
            writeln!(f)?;
        }

        if let Some(detail) = &self.detail {
            writeln!(f, "--- {} ---", detail.event_id)?;
            writeln!(f, "{}", detail.json)?;
        }

        if let Some(notification) = &self.notification {
            let tag = match notification.kind {
                NotificationKind::Info => "info",
                NotificationKind::Error => "error",
            };
            writeln!(f, "({}) {}", tag, notification.message)?;
        }

        Ok(())
    }
}

/// Keeps the [`EventPanel`] consistent with the store.
#[derive(Debug, Clone)]
pub struct RenderCoordinator {
    config: RenderConfig,
    export_prefix: String,
    panel: EventPanel,
}

impl RenderCoordinator {
    /// Creates a coordinator with an empty panel.
    pub fn new(config: RenderConfig, export_prefix: impl Into<String>) -> Self {
        Self {
            config,
            export_prefix: export_prefix.into(),
            panel: EventPanel::default(),
        }
    }

    /// Returns the current panel.
    pub fn panel(&self) -> &EventPanel {
        &self.panel
    }

    /// Patches a freshly captured event into the list.
    ///
    /// Counters are refreshed whether or not the event passes the filter.
    pub fn on_event_captured(&mut self, event: &CapturedEvent, store: &EventStore) {
        self.panel.counters = store.counters();

        if !event.matches(self.panel.filter) {
            return;
        }

        self.panel.placeholder = None;
        self.panel
            .rows
            .push_front(EventRow::from_event(event, &self.config));
        self.panel.rows.truncate(self.config.max_rows);
    }

    /// Switches filter and rebuilds the list from the store.
    pub fn on_filter_changed(&mut self, filter: Filter, store: &mut EventStore) {
        store.set_active_filter(filter);
        self.panel.filter = filter;
        self.rebuild(store);
    }

    /// Clears the store and resets the panel.
    pub fn on_clear_requested(&mut self, store: &mut EventStore) {
        store.clear();
        self.panel.rows.clear();
        self.panel.placeholder = Some(Placeholder::Waiting);
        self.panel.counters = Counters::default();
        tracing::info!("Cleared captured events");
    }

    /// Opens the detail panel for an event.
    pub fn on_detail_requested(&mut self, event: &CapturedEvent) {
        match event.to_json_pretty() {
            Ok(json) => {
                self.panel.detail = Some(DetailPanel {
                    event_id: event.id.clone(),
                    json,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to render event {}: {}", event.id, e);
                self.notify(NotificationKind::Error, format!("Cannot show event: {}", e));
            }
        }
    }

    /// Closes the detail panel.
    pub fn close_detail(&mut self) {
        self.panel.detail = None;
    }

    /// Exports the full history through `target`.
    ///
    /// The store is only read. Failures are shown as a notification and
    /// returned; the export can simply be retried.
    pub fn on_export_requested(
        &mut self,
        store: &EventStore,
        target: &mut dyn ExportTarget,
        today: NaiveDate,
    ) -> Result<PathBuf, ExportError> {
        let snapshot = store.snapshot();
        let result = ExportFile::from_events(&self.export_prefix, today, &snapshot)
            .and_then(|file| target.save(&file));

        match &result {
            Ok(path) => {
                tracing::info!("Exported {} events to {:?}", snapshot.len(), path);
                self.notify(
                    NotificationKind::Info,
                    format!("Exported {} events to {}", snapshot.len(), path.display()),
                );
            }
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                self.notify(NotificationKind::Error, format!("Export failed: {}", e));
            }
        }
        result
    }

    /// Clears the current notification.
    pub fn dismiss_notification(&mut self) {
        self.panel.notification = None;
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        self.panel.notification = Some(Notification { kind, message });
    }

    fn rebuild(&mut self, store: &EventStore) {
        self.panel.counters = store.counters();
        self.panel.rows = store
            .query(self.panel.filter, self.config.max_rows)
            .into_iter()
            .map(|event| EventRow::from_event(event, &self.config))
            .collect();
        self.panel.placeholder = if self.panel.rows.is_empty() {
            Some(Placeholder::NoMatches)
        } else {
            None
        };
    }
}
