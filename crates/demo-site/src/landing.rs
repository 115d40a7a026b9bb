//! Landing page producers.
//!
//! Navigation links, hoverable buttons and tool cards, the hero image, the
//! playlist cards and the in-page demo console.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::json;
use tag_events::{display_time, into_params, iso_timestamp, Clock, SystemClock, Tracker};

use crate::SiteError;

/// Lines kept by the demo console.
pub const CONSOLE_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePage {
    Home,
    Playlist,
    UtmBuilder,
}

impl SitePage {
    pub fn as_str(self) -> &'static str {
        match self {
            SitePage::Home => "home",
            SitePage::Playlist => "playlist",
            SitePage::UtmBuilder => "utm-builder",
        }
    }
}

impl fmt::Display for SitePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SitePage {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(SitePage::Home),
            "playlist" => Ok(SitePage::Playlist),
            "utm-builder" => Ok(SitePage::UtmBuilder),
            other => Err(SiteError::UnknownPage(other.to_string())),
        }
    }
}

/// One console entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub time: String,
    pub event: String,
    pub text: String,
}

impl fmt::Display for ConsoleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} → {}", self.time, self.event, self.text)
    }
}

/// Scrolling console echoing demo button pushes, newest last.
#[derive(Debug, Clone, Default)]
pub struct DemoConsole {
    lines: VecDeque<ConsoleLine>,
}

impl DemoConsole {
    fn push(&mut self, line: ConsoleLine) {
        self.lines.push_back(line);
        while self.lines.len() > CONSOLE_LINES {
            self.lines.pop_front();
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub struct LandingPage {
    page: SitePage,
    console: DemoConsole,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for LandingPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandingPage")
            .field("page", &self.page)
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

impl LandingPage {
    pub fn new(page: SitePage) -> Self {
        Self::with_clock(page, Arc::new(SystemClock))
    }

    pub fn with_clock(page: SitePage, clock: Arc<dyn Clock>) -> Self {
        Self {
            page,
            console: DemoConsole::default(),
            clock,
        }
    }

    pub fn page(&self) -> SitePage {
        self.page
    }

    pub fn console(&self) -> &DemoConsole {
        &self.console
    }

    /// Page initialisation.
    ///
    /// Home and playlist report a `page_view` with `page_name`; the UTM
    /// builder page announces itself through the builder instead.
    pub fn load(&self, tracker: &mut impl Tracker) {
        match self.page {
            SitePage::Home | SitePage::Playlist => tracker.track(
                "page_view",
                into_params(json!({ "page_name": self.page.as_str() })),
            ),
            SitePage::UtmBuilder => {}
        }
    }

    /// Nav link or logo; links without a target count as `home`.
    pub fn navigation_click(&self, target: Option<&str>, tracker: &mut impl Tracker) {
        tracker.track(
            "navigation_click",
            into_params(json!({ "nav_target": target.unwrap_or("home") })),
        );
    }

    pub fn hover_button(&self, name: &str, tracker: &mut impl Tracker) {
        tracker.track("hover_button", into_params(json!({ "button_name": name })));
    }

    pub fn button_click(&self, name: &str, tracker: &mut impl Tracker) {
        tracker.track("button_click", into_params(json!({ "button_name": name })));
    }

    /// Tool cards on the home page and track cards on the playlist page.
    pub fn hover_card(&self, name: &str, tracker: &mut impl Tracker) {
        tracker.track("hover_card", into_params(json!({ "card_name": name })));
    }

    pub fn card_click(&self, name: &str, tracker: &mut impl Tracker) {
        tracker.track("card_click", into_params(json!({ "card_name": name })));
    }

    pub fn hover_image(&self, element_id: &str, tracker: &mut impl Tracker) {
        tracker.track("hover_immagine", into_params(json!({ "element_id": element_id })));
    }

    /// Demo console button: a timestamped `button_click`, echoed to the
    /// console.
    pub fn demo_button(&mut self, demo_id: &str, tracker: &mut impl Tracker) {
        let now = self.clock.now();
        tracker.track(
            "button_click",
            into_params(json!({
                "button_name": demo_id,
                "timestamp": iso_timestamp(&now),
            })),
        );
        self.console.push(ConsoleLine {
            time: display_time(&now),
            event: "button_click".to_string(),
            text: demo_id.to_string(),
        });
    }
}
