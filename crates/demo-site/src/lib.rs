//! Instrumented demo pages that feed the GA4 debugger.
//!
//! Each producer models one interactive surface and reports what the user
//! did through a [`Tracker`]. Producers that fire after a delay need a
//! [`Schedule`], which the session handle provides by spawning a timer and
//! recording trackers provide by recording immediately.
//!
//! # Modules
//!
//! - [`shop`]: Demo e-commerce shop (pages, catalog, cart, forms)
//! - [`landing`]: Landing page navigation, buttons, cards and demo console
//! - [`audio`]: Embedded audio player tracking with async position queries
//! - [`scenario`]: Seeded random shopper driving the shop

pub mod audio;
pub mod landing;
pub mod scenario;
pub mod shop;

pub use audio::{track_label, AudioTracker, AudioWidget, ScriptedWidget};
pub use landing::{ConsoleLine, DemoConsole, LandingPage, SitePage};
pub use scenario::{Scenario, ShopperAction};
pub use shop::{find_product, DemoShop, FormField, Page, Product, CATALOG};

use std::time::Duration;

use debugger::{Debugger, SessionHandle};
use tag_events::{Params, Tracker};

/// Errors raised by demo producers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    #[error("unknown page: '{0}'")]
    UnknownPage(String),
    #[error("unknown product: '{0}'")]
    UnknownProduct(String),
    #[error("unknown form field: '{0}'")]
    UnknownField(String),
}

/// A tracker that can also deliver events later.
pub trait Schedule: Tracker {
    fn track_after(&mut self, delay: Duration, name: &str, params: Params);
}

impl Schedule for SessionHandle {
    fn track_after(&mut self, delay: Duration, name: &str, params: Params) {
        SessionHandle::track_after(self, delay, name, params);
    }
}

/// Synchronous use: delayed events are captured right away.
impl Schedule for Debugger {
    fn track_after(&mut self, _delay: Duration, name: &str, params: Params) {
        self.track(name, params);
    }
}

impl Schedule for Vec<(String, Params)> {
    fn track_after(&mut self, _delay: Duration, name: &str, params: Params) {
        self.track(name, params);
    }
}

impl<S: Schedule + ?Sized> Schedule for &mut S {
    fn track_after(&mut self, delay: Duration, name: &str, params: Params) {
        (**self).track_after(delay, name, params);
    }
}
