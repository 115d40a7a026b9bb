//! Event categories and display filters.
//!
//! # Example
//!
//! ```
//! use tag_events::{Category, Filter};
//!
//! assert_eq!(Category::Ecommerce.to_string(), "ecommerce");
//! assert_eq!(Filter::parse_lossy("page"), Filter::Only(Category::Page));
//! assert_eq!(Filter::parse_lossy("bogus"), Filter::All);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Category an event is classified into at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Page,
    Ecommerce,
    Engagement,
    Custom,
}

impl Category {
    /// Returns all category variants in classification order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Page,
            Category::Ecommerce,
            Category::Engagement,
            Category::Custom,
        ]
    }

    /// Returns the token used on the wire and in filter commands.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Page => "page",
            Category::Ecommerce => "ecommerce",
            Category::Engagement => "engagement",
            Category::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a category or filter token is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: '{0}', expected one of all|page|ecommerce|engagement|custom")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "page" => Ok(Category::Page),
            "ecommerce" => Ok(Category::Ecommerce),
            "engagement" => Ok(Category::Engagement),
            "custom" => Ok(Category::Custom),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// What the debugger panel currently shows.
///
/// Serializes to the same literal tokens the filter tabs use
/// (`all`, `page`, `ecommerce`, `engagement`, `custom`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    All,
    Only(Category),
}

impl Filter {
    /// Parses a filter token, falling back to [`Filter::All`] for anything
    /// unrecognized.
    pub fn parse_lossy(token: &str) -> Self {
        token.parse().unwrap_or(Filter::All)
    }

    /// Returns true if an event of `category` passes this filter.
    pub fn matches(self, category: Category) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == category,
        }
    }

    /// Returns the filter token.
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Only(category) => category.as_str(),
        }
    }
}

impl From<Category> for Filter {
    fn from(category: Category) -> Self {
        Filter::Only(category)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        s.parse::<Category>().map(Filter::Only)
    }
}

// Filters travel as plain tokens, not as tagged enums
impl Serialize for Filter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
