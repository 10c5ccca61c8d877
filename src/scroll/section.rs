//! Section identifiers and their vertical spans.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of a scrollable page region.
///
/// The string form matches the element id of the section container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Home,
    Events,
    Timeline,
    Rules,
    Contact,
}

impl SectionId {
    /// Every section in page order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Events,
        Self::Timeline,
        Self::Rules,
        Self::Contact,
    ];

    /// Sections the composed page currently renders (rules is disabled).
    pub const PAGE: [Self; 4] = [Self::Home, Self::Events, Self::Timeline, Self::Contact];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Events => "events",
            Self::Timeline => "timeline",
            Self::Rules => "rules",
            Self::Contact => "contact",
        }
    }

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Events => "Events",
            Self::Timeline => "Timeline",
            Self::Rules => "Rules",
            Self::Contact => "Contact",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section '{name}'{}", .suggestion.map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
pub struct ParseSectionError {
    /// The rejected input.
    pub name: String,
    /// Closest known section, if any is close enough.
    pub suggestion: Option<&'static str>,
}

/// Maximum edit distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

impl FromStr for SectionId {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = Self::ALL.into_iter().find(|id| id.as_str() == s) {
            return Ok(id);
        }

        let suggestion = Self::ALL
            .into_iter()
            .map(|id| (id.as_str(), strsim::damerau_levenshtein(s, id.as_str())))
            .filter(|(_, d)| *d <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(_, d)| *d)
            .map(|(name, _)| name);

        Err(ParseSectionError {
            name: s.to_owned(),
            suggestion,
        })
    }
}

/// Vertical extent of a section, in page units.
///
/// Covers the half-open interval `[start, start + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionSpan {
    /// Offset of the section's top edge from the top of the page.
    pub start: f64,
    /// Rendered height.
    pub height: f64,
}

impl SectionSpan {
    #[must_use]
    pub const fn new(start: f64, height: f64) -> Self {
        Self { start, height }
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.height
    }

    /// Returns `true` if `position` lies within the span.
    ///
    /// A span with non-positive height contains nothing.
    #[must_use]
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end()
    }

    /// Returns `true` if the two spans share any position.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.height > 0.0
            && other.height > 0.0
            && self.start < other.end()
            && other.start < self.end()
    }
}
