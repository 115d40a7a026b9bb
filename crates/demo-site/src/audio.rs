//! Embedded audio player tracking.
//!
//! The player widget reports its playback position asynchronously, so play
//! and pause events are sent to the session from a spawned task once the
//! position arrives. A play run reports `soundcloud_play` once; pause and
//! finish end the run.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use debugger::{Command, SessionHandle};
use serde_json::json;
use tag_events::into_params;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A player that answers position queries later.
pub trait AudioWidget: Send + Sync + 'static {
    fn request_position(&self) -> oneshot::Receiver<Duration>;
}

/// Widget with a settable position and a fixed reply latency.
#[derive(Debug, Default)]
pub struct ScriptedWidget {
    position: Mutex<Duration>,
    latency: Duration,
}

impl ScriptedWidget {
    pub fn new(latency: Duration) -> Self {
        Self {
            position: Mutex::new(Duration::ZERO),
            latency,
        }
    }

    pub fn seek(&self, position: Duration) {
        if let Ok(mut current) = self.position.lock() {
            *current = position;
        }
    }

    pub fn position(&self) -> Duration {
        self.position.lock().map(|p| *p).unwrap_or_default()
    }
}

impl AudioWidget for ScriptedWidget {
    /// Replies with the position at request time. A non-zero latency needs a
    /// Tokio runtime.
    fn request_position(&self) -> oneshot::Receiver<Duration> {
        let (tx, rx) = oneshot::channel();
        let position = self.position();
        if self.latency.is_zero() {
            let _ = tx.send(position);
        } else {
            let latency = self.latency;
            tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                let _ = tx.send(position);
            });
        }
        rx
    }
}

/// Display name for the `index`-th player, falling back to `Track N`.
pub fn track_label(name: Option<&str>, index: usize) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Track {}", index + 1),
    }
}

/// Tracks one player.
#[derive(Debug)]
pub struct AudioTracker<W> {
    track_name: String,
    widget: Arc<W>,
    handle: SessionHandle,
    has_played: bool,
}

impl<W: AudioWidget> AudioTracker<W> {
    pub fn new(track_name: impl Into<String>, widget: Arc<W>, handle: SessionHandle) -> Self {
        Self {
            track_name: track_name.into(),
            widget,
            handle,
            has_played: false,
        }
    }

    pub fn track_name(&self) -> &str {
        &self.track_name
    }

    pub fn has_played(&self) -> bool {
        self.has_played
    }

    /// Play pressed. Only the first play of a run reports; the returned task
    /// resolves once the event has been queued.
    pub fn on_play(&mut self) -> Option<JoinHandle<bool>> {
        if self.has_played {
            return None;
        }
        self.has_played = true;
        Some(self.report_position("soundcloud_play"))
    }

    pub fn on_pause(&mut self) -> JoinHandle<bool> {
        self.has_played = false;
        self.report_position("soundcloud_pause")
    }

    /// Playback reached the end. Reported immediately, with `"end"` in
    /// place of a position.
    pub fn on_finish(&mut self) -> bool {
        self.has_played = false;
        self.handle.send(Command::Track {
            name: "soundcloud_finish".to_string(),
            params: into_params(json!({
                "track_name": self.track_name,
                "timestamp": "end",
            })),
        })
    }

    fn report_position(&self, event: &'static str) -> JoinHandle<bool> {
        let position = self.widget.request_position();
        let handle = self.handle.clone();
        let track_name = self.track_name.clone();
        tokio::spawn(async move {
            match position.await {
                Ok(position) => handle.send(Command::Track {
                    name: event.to_string(),
                    params: into_params(json!({
                        "track_name": track_name,
                        "timestamp": position.as_secs(),
                    })),
                }),
                Err(_) => {
                    tracing::debug!("Player dropped position query for {}", track_name);
                    false
                }
            }
        })
    }
}
