//! In-memory event history and counters.
//!
//! The store owns the newest-first history of captured events, the running
//! counters derived from it, and the active display filter. History is not
//! capped: only the rendered list is bounded.

use std::collections::VecDeque;

use tag_events::{CapturedEvent, Clock, Counters, EventId, Filter, Params, SystemClock};

use crate::classifier::EventClassifier;

/// Ordered history of captured events plus aggregate counters.
pub struct EventStore {
    /// Captured events, newest first
    history: VecDeque<CapturedEvent>,
    /// Counters over `history`
    counters: Counters,
    /// Filter selected in the panel
    active_filter: Filter,
    /// Classifier applied at ingest
    classifier: EventClassifier,
    /// Source of capture instants
    clock: Box<dyn Clock>,
    /// Next id sequence number; survives `clear()`
    next_sequence: u64,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("len", &self.history.len())
            .field("counters", &self.counters)
            .field("active_filter", &self.active_filter)
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(EventClassifier::default(), Box::new(SystemClock))
    }
}

impl EventStore {
    /// Creates an empty store.
    pub fn new(classifier: EventClassifier, clock: Box<dyn Clock>) -> Self {
        Self {
            history: VecDeque::new(),
            counters: Counters::default(),
            active_filter: Filter::All,
            classifier,
            clock,
            next_sequence: 1,
        }
    }

    /// Captures an event and returns the stored record.
    ///
    /// Empty names are accepted and classified as `custom`.
    pub fn ingest(&mut self, name: &str, params: Params) -> CapturedEvent {
        let instant = self.clock.now();
        let id = EventId::new(instant.timestamp_millis(), self.next_sequence);
        self.next_sequence += 1;

        let category = self.classifier.classify(name);
        let event = CapturedEvent::new(id, instant, name, category, params);

        self.counters.record(category);
        self.history.push_front(event.clone());

        tracing::debug!(event = %event.name, category = %category, id = %event.id, "captured event");
        event
    }

    /// Empties the history and zeroes every counter.
    pub fn clear(&mut self) {
        self.history.clear();
        self.counters.reset();
    }

    /// Returns up to `limit` events passing `filter`, newest first.
    pub fn query(&self, filter: Filter, limit: usize) -> Vec<&CapturedEvent> {
        self.history
            .iter()
            .filter(|event| event.matches(filter))
            .take(limit)
            .collect()
    }

    /// Returns the full history, newest first.
    pub fn snapshot(&self) -> Vec<&CapturedEvent> {
        self.history.iter().collect()
    }

    /// Looks up an event by id.
    pub fn get(&self, id: &EventId) -> Option<&CapturedEvent> {
        self.history.iter().find(|event| &event.id == id)
    }

    /// Returns the current counters.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Returns the filter selected in the panel.
    pub fn active_filter(&self) -> Filter {
        self.active_filter
    }

    /// Selects the display filter. History and counters are untouched.
    pub fn set_active_filter(&mut self, filter: Filter) {
        self.active_filter = filter;
    }

    /// Returns the number of captured events.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if nothing has been captured since the last clear.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns the classifier used at ingest.
    pub fn classifier(&self) -> &EventClassifier {
        &self.classifier
    }
}
