//! Single-threaded command dispatch.
//!
//! Producers that live outside the debugger's call stack (timers, widget
//! callbacks, async position queries) talk to it through a cloneable
//! [`SessionHandle`]. The [`Session`] owns the [`Debugger`] and applies
//! commands one at a time, in the order they were sent, so every handler runs
//! to completion before the next one starts and no locking is needed.
//!
//! There is no notion of a session epoch: a command that arrives after a
//! clear simply lands in the now-empty history.

use std::time::Duration;
use tokio::sync::mpsc;

use tag_events::{EventId, Params, Tracker};

use crate::Debugger;

/// A request for the debugger.
#[derive(Debug, Clone)]
pub enum Command {
    /// Capture an event
    Track { name: String, params: Params },
    /// Switch the panel filter (token, parsed leniently)
    SetFilter(String),
    /// Clear history and panel
    Clear,
    /// Open the detail panel for an event
    ShowDetail(EventId),
    /// Close the detail panel
    CloseDetail,
    /// Export the history
    Export,
    /// Stop the session
    Shutdown,
}

/// Cloneable sender side of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Queues a command. Returns false if the session has already stopped.
    pub fn send(&self, command: Command) -> bool {
        match self.tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Session stopped, dropping {:?}", e.0);
                false
            }
        }
    }

    /// Queues an event capture after `delay`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn track_after(&self, delay: Duration, name: impl Into<String>, params: Params) {
        let handle = self.clone();
        let name = name.into();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.send(Command::Track { name, params });
        });
    }

    /// Queues a filter change.
    pub fn set_filter(&self, token: impl Into<String>) -> bool {
        self.send(Command::SetFilter(token.into()))
    }

    /// Queues a clear.
    pub fn clear(&self) -> bool {
        self.send(Command::Clear)
    }

    /// Queues an export.
    pub fn export(&self) -> bool {
        self.send(Command::Export)
    }

    /// Asks the session to stop after the commands already queued.
    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }
}

impl Tracker for SessionHandle {
    fn track(&mut self, name: &str, params: Params) {
        self.send(Command::Track {
            name: name.to_string(),
            params,
        });
    }
}

/// Owns the debugger and applies queued commands in order.
#[derive(Debug)]
pub struct Session {
    debugger: Debugger,
    rx: mpsc::UnboundedReceiver<Command>,
    commands_applied: u64,
}

impl Session {
    /// Wraps a debugger, returning the session and its first handle.
    pub fn new(debugger: Debugger) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            debugger,
            rx,
            commands_applied: 0,
        };
        (session, SessionHandle { tx })
    }

    /// Runs until every handle is dropped or a shutdown is received, then
    /// hands the debugger back.
    pub async fn run(mut self) -> Debugger {
        while let Some(command) = self.rx.recv().await {
            if !self.apply(command) {
                break;
            }
        }
        tracing::debug!("Session finished after {} commands", self.commands_applied);
        self.debugger
    }

    /// Applies one command. Returns false on shutdown.
    pub fn apply(&mut self, command: Command) -> bool {
        self.commands_applied += 1;
        match command {
            Command::Track { name, params } => {
                self.debugger.capture(&name, params);
            }
            Command::SetFilter(token) => {
                self.debugger.set_filter(&token);
            }
            Command::Clear => self.debugger.clear(),
            Command::ShowDetail(id) => {
                if !self.debugger.show_detail(&id) {
                    tracing::debug!("No event {} to show", id);
                }
            }
            Command::CloseDetail => self.debugger.close_detail(),
            Command::Export => {
                // Already surfaced as a panel notification
                if let Err(e) = self.debugger.export() {
                    tracing::warn!("Export from session failed: {}", e);
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    /// Returns the debugger being driven.
    pub fn debugger(&self) -> &Debugger {
        &self.debugger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebuggerConfig, NullSink};
    use std::sync::Arc;
    use tag_events::{Category, Filter, ManualClock};

    fn debugger() -> Debugger {
        let clock = Arc::new(ManualClock::at("2024-05-01T10:00:00.000+00:00").unwrap());
        Debugger::new(DebuggerConfig::default(), Box::new(NullSink), clock).unwrap()
    }

    fn names(debugger: &Debugger) -> Vec<String> {
        debugger.store().snapshot().iter().map(|e| e.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_commands_applied_in_order() {
        let (session, mut handle) = Session::new(debugger());
        handle.track("page_view", Params::new());
        handle.track("click", Params::new());
        handle.set_filter("engagement");
        handle.track("purchase", Params::new());
        drop(handle);

        let debugger = session.run().await;
        assert_eq!(names(&debugger), vec!["purchase", "click", "page_view"]);
        assert_eq!(debugger.store().active_filter(), Filter::Only(Category::Engagement));
        assert_eq!(debugger.panel().row_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_processing() {
        let (session, mut handle) = Session::new(debugger());
        handle.track("page_view", Params::new());
        handle.shutdown();
        handle.track("click", Params::new());

        let debugger = session.run().await;
        assert_eq!(names(&debugger), vec!["page_view"]);
        assert!(!handle.clear());
    }

    #[tokio::test]
    async fn test_delayed_event_lands_after_clear() {
        let (session, mut handle) = Session::new(debugger());
        let runner = tokio::spawn(session.run());

        handle.track("page_view", Params::new());
        handle.track_after(Duration::from_millis(20), "view_item_list", Params::new());
        handle.clear();

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown();
        let debugger = runner.await.unwrap();

        assert_eq!(names(&debugger), vec!["view_item_list"]);
        assert_eq!(debugger.store().counters().total, 1);
        assert_eq!(debugger.store().counters().ecommerce_events, 1);
    }

    #[tokio::test]
    async fn test_handles_from_many_producers() {
        let (session, handle) = Session::new(debugger());
        let runner = tokio::spawn(session.run());

        let mut producers = Vec::new();
        for i in 0..4 {
            let mut producer = handle.clone();
            producers.push(tokio::spawn(async move {
                for _ in 0..5 {
                    producer.track(&format!("producer_{}_click", i), Params::new());
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        drop(handle);

        let debugger = runner.await.unwrap();
        assert_eq!(debugger.store().counters().total, 20);
        assert_eq!(debugger.panel().row_count(), 20);
    }

    #[tokio::test]
    async fn test_unknown_detail_is_ignored() {
        let (mut session, _handle) = Session::new(debugger());
        assert!(session.apply(Command::ShowDetail(EventId::from("evt_none"))));
        assert!(session.debugger().panel().detail().is_none());
    }
}
