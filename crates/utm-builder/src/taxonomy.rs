//! UTM source/medium taxonomy.

/// A medium allowed under a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Medium {
    /// Value written to `utm_medium`
    pub value: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

/// A traffic source and its allowed mediums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    /// Value written to `utm_source`
    pub key: &'static str,
    pub label: &'static str,
    pub mediums: &'static [Medium],
}

impl Source {
    /// Looks up one of this source's mediums.
    pub fn medium(&self, value: &str) -> Option<&'static Medium> {
        self.mediums.iter().find(|m| m.value == value)
    }
}

const fn medium(value: &'static str, label: &'static str) -> Medium {
    Medium { value, label }
}

static SOURCES: &[Source] = &[
    Source {
        key: "social",
        label: "Social",
        mediums: &[
            medium("facebook", "Facebook"),
            medium("instagram", "Instagram"),
            medium("linkedin", "LinkedIn"),
            medium("twitter", "Twitter/X"),
            medium("youtube", "YouTube"),
            medium("tiktok", "TikTok"),
            medium("pinterest", "Pinterest"),
            medium("threads", "Threads"),
        ],
    },
    Source {
        key: "email",
        label: "Email",
        mediums: &[
            medium("newsletter", "Newsletter"),
            medium("dem", "DEM"),
            medium("transactional", "Transactional"),
            medium("automated", "Automated"),
            medium("welcome_series", "Welcome Series"),
            medium("retention", "Retention"),
        ],
    },
    Source {
        key: "paid",
        label: "Paid Ads",
        mediums: &[
            medium("cpc", "CPC"),
            medium("cpm", "CPM"),
            medium("display", "Display"),
            medium("retargeting", "Retargeting"),
            medium("native", "Native"),
            medium("video", "Video"),
            medium("shopping", "Shopping"),
            medium("pmax", "Performance Max"),
        ],
    },
    Source {
        key: "referral",
        label: "Referral",
        mediums: &[
            medium("partner", "Partner"),
            medium("blog", "Blog"),
            medium("pr", "PR"),
            medium("press", "Press"),
            medium("guest_post", "Guest Post"),
            medium("forum", "Forum"),
        ],
    },
    Source {
        key: "affiliate",
        label: "Affiliate",
        mediums: &[
            medium("affiliate", "Affiliate Link"),
            medium("influencer", "Influencer"),
            medium("ambassador", "Ambassador"),
            medium("ugc", "UGC"),
            medium("review", "Review"),
        ],
    },
    Source {
        key: "display",
        label: "Display",
        mediums: &[
            medium("banner", "Banner"),
            medium("native", "Native"),
            medium("programmatic", "Programmatic"),
            medium("rich_media", "Rich Media"),
            medium("interstitial", "Interstitial"),
        ],
    },
];

/// Returns every source, in display order.
pub fn sources() -> &'static [Source] {
    SOURCES
}

/// Looks up a source by key.
pub fn find_source(key: &str) -> Option<&'static Source> {
    SOURCES.iter().find(|s| s.key == key)
}
