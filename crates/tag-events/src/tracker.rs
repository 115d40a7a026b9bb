//! The producer-facing ingestion interface.
//!
//! Every instrumented element (buttons, product cards, forms, the audio
//! widget, the UTM builder) only ever sees a [`Tracker`]. The debugger
//! implements it directly; a session handle implements it by queueing.

use crate::event::Params;

/// Narrow interface producers push analytics events through.
pub trait Tracker {
    /// Records one event with its parameters.
    fn track(&mut self, name: &str, params: Params);
}

impl<T: Tracker + ?Sized> Tracker for &mut T {
    fn track(&mut self, name: &str, params: Params) {
        (**self).track(name, params);
    }
}

/// Recording tracker, handy for producer tests.
impl Tracker for Vec<(String, Params)> {
    fn track(&mut self, name: &str, params: Params) {
        self.push((name.to_string(), params));
    }
}
