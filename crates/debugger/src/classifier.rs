//! Event classification by name.
//!
//! Maps an event name to a [`Category`] with an ordered rule list. Each rule
//! owns a set of marker substrings; the first rule with a marker contained in
//! the (lowercased) name wins, and names matching nothing are `custom`.
//!
//! Rule order is a tie-break policy: `page_view_click` contains both a page
//! and an engagement marker and is classified `page` because page rules are
//! checked first.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tag_events::Category;

/// A category and the marker substrings that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    /// Category assigned when a marker matches
    pub category: Category,
    /// Substrings looked for in the event name
    pub markers: Vec<String>,
}

impl ClassifierRule {
    /// Creates a rule from a category and its markers.
    pub fn new(category: Category, markers: &[&str]) -> Self {
        Self {
            category,
            markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Returns the standard GA4 rule table: page, ecommerce, engagement.
    pub fn default_rules() -> Vec<ClassifierRule> {
        vec![
            ClassifierRule::new(Category::Page, &["page_view", "virtual_pageview"]),
            ClassifierRule::new(
                Category::Ecommerce,
                &[
                    "view_item",
                    "add_to_cart",
                    "remove_from_cart",
                    "begin_checkout",
                    "purchase",
                    "view_item_list",
                    "select_item",
                ],
            ),
            ClassifierRule::new(
                Category::Engagement,
                &[
                    "click",
                    "scroll",
                    "video_start",
                    "video_complete",
                    "file_download",
                    "form_start",
                    "form_submit",
                    "newsletter_signup",
                    "social_click",
                ],
            ),
        ]
    }
}

/// Errors raised when building a classifier from a custom rule table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    /// `custom` is the fallback and cannot own markers
    #[error("rule {index} targets the fallback category 'custom'")]
    FallbackRule { index: usize },
    /// A marker that is empty would match every name
    #[error("rule {index} ({category}) has an empty marker")]
    EmptyMarker { index: usize, category: Category },
}

/// Ordered substring classifier.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    /// Rules with lowercased markers, in match order
    rules: Vec<ClassifierRule>,
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self {
            rules: normalize(ClassifierRule::default_rules()),
        }
    }
}

impl EventClassifier {
    /// Builds a classifier from a custom rule table.
    pub fn from_rules(rules: Vec<ClassifierRule>) -> Result<Self, ClassifierError> {
        for (index, rule) in rules.iter().enumerate() {
            if rule.category == Category::Custom {
                return Err(ClassifierError::FallbackRule { index });
            }
            if rule.markers.iter().any(|m| m.trim().is_empty()) {
                return Err(ClassifierError::EmptyMarker {
                    index,
                    category: rule.category,
                });
            }
        }
        Ok(Self {
            rules: normalize(rules),
        })
    }

    /// Classifies an event name. Never fails; unmatched names are `custom`.
    pub fn classify(&self, name: &str) -> Category {
        let name = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.markers.iter().any(|m| name.contains(m.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(Category::Custom)
    }

    /// Returns the rule table in match order.
    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }
}

fn normalize(rules: Vec<ClassifierRule>) -> Vec<ClassifierRule> {
    rules
        .into_iter()
        .map(|rule| ClassifierRule {
            category: rule.category,
            markers: rule.markers.iter().map(|m| m.to_lowercase()).collect(),
        })
        .collect()
}

/// Classifies with the default rule table.
pub fn classify(name: &str) -> Category {
    static DEFAULT: OnceLock<EventClassifier> = OnceLock::new();
    DEFAULT.get_or_init(EventClassifier::default).classify(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_events() {
        assert_eq!(classify("page_view"), Category::Page);
        assert_eq!(classify("virtual_pageview"), Category::Page);
    }

    #[test]
    fn test_ecommerce_events() {
        for name in [
            "view_item",
            "view_item_list",
            "add_to_cart",
            "remove_from_cart",
            "begin_checkout",
            "purchase",
            "select_item",
        ] {
            assert_eq!(classify(name), Category::Ecommerce, "{}", name);
        }
    }

    #[test]
    fn test_engagement_events() {
        for name in ["click", "scroll", "form_start", "newsletter_signup", "social_click"] {
            assert_eq!(classify(name), Category::Engagement, "{}", name);
        }
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(classify("button_click"), Category::Engagement);
        assert_eq!(classify("navigation_click"), Category::Engagement);
        assert_eq!(classify("refund_purchase_v2"), Category::Ecommerce);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("PAGE_VIEW"), Category::Page);
        assert_eq!(classify("Add_To_Cart"), Category::Ecommerce);
    }

    #[test]
    fn test_unmatched_is_custom() {
        assert_eq!(classify("select_promotion"), Category::Custom);
        assert_eq!(classify("soundcloud_play"), Category::Custom);
        assert_eq!(classify("utm_source_selected"), Category::Custom);
        assert_eq!(classify(""), Category::Custom);
    }

    #[test]
    fn test_first_match_wins() {
        // page and engagement markers both present
        assert_eq!(classify("page_view_click"), Category::Page);
        // ecommerce and engagement markers both present
        assert_eq!(classify("add_to_cart_click"), Category::Ecommerce);
        // page and ecommerce markers both present
        assert_eq!(classify("purchase_page_view"), Category::Page);
    }

    #[test]
    fn test_rule_order_is_configurable() {
        let classifier = EventClassifier::from_rules(vec![
            ClassifierRule::new(Category::Engagement, &["click"]),
            ClassifierRule::new(Category::Page, &["page_view"]),
        ])
        .unwrap();
        assert_eq!(classifier.classify("page_view_click"), Category::Engagement);
        assert_eq!(classifier.classify("page_view"), Category::Page);
        assert_eq!(classifier.classify("add_to_cart"), Category::Custom);
    }

    #[test]
    fn test_markers_are_lowercased() {
        let classifier =
            EventClassifier::from_rules(vec![ClassifierRule::new(Category::Page, &["Screen_View"])])
                .unwrap();
        assert_eq!(classifier.classify("screen_view"), Category::Page);
        assert_eq!(classifier.rules()[0].markers, vec!["screen_view".to_string()]);
    }

    #[test]
    fn test_rejects_custom_rule() {
        let result =
            EventClassifier::from_rules(vec![ClassifierRule::new(Category::Custom, &["x"])]);
        assert_eq!(result.unwrap_err(), ClassifierError::FallbackRule { index: 0 });
    }

    #[test]
    fn test_rejects_empty_marker() {
        let result = EventClassifier::from_rules(vec![
            ClassifierRule::new(Category::Page, &["page_view"]),
            ClassifierRule::new(Category::Ecommerce, &[" "]),
        ]);
        assert_eq!(
            result.unwrap_err(),
            ClassifierError::EmptyMarker {
                index: 1,
                category: Category::Ecommerce
            }
        );
    }

    #[test]
    fn test_deterministic() {
        for name in ["page_view", "click", "mystery", "view_item"] {
            assert_eq!(classify(name), classify(name));
        }
    }
}
