//! Configuration schema types
//!
//! YAML documents consumed by the CLI: the site description (sections,
//! intro timings, countdown, layout) and scroll traces that replay a
//! visitor's scrolling against it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::countdown::{self, DEFAULT_TARGET};
use crate::error::ConfigError;
use crate::intro::IntroTimings;
use crate::scroll::{HEADER_OFFSET, PageLayout, SectionId, SectionSpan};

// ============================================================================
// Site Configuration
// ============================================================================

/// Root configuration for one page.
///
/// Every field is optional; an empty document describes the page as
/// deployed (four sections, default intro, 80px header).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Tracked sections, in priority order
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Sticky header height added to the scroll offset
    #[serde(default = "default_header_offset")]
    pub header_offset: f64,

    /// Intro timeline overrides
    #[serde(default)]
    pub intro: IntroConfig,

    /// Hero countdown settings
    #[serde(default)]
    pub countdown: CountdownConfig,

    /// Section geometry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layout: Vec<SectionGeometry>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            header_offset: default_header_offset(),
            intro: IntroConfig::default(),
            countdown: CountdownConfig::default(),
            layout: Vec::new(),
        }
    }
}

fn default_sections() -> Vec<String> {
    SectionId::PAGE.iter().map(|s| s.as_str().to_owned()).collect()
}

const fn default_header_offset() -> f64 {
    HEADER_OFFSET
}

impl SiteConfig {
    /// Resolves `sections` to identifiers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first unknown name.
    pub fn section_ids(&self) -> Result<Vec<SectionId>, ConfigError> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, name)| parse_section(&format!("sections[{i}]"), name))
            .collect()
    }

    /// Resolves the intro timings, filling unset steps with defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable duration.
    pub fn intro_timings(&self) -> Result<IntroTimings, ConfigError> {
        self.intro.resolve()
    }

    /// Builds the page layout from `layout`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown section name.
    pub fn page_layout(&self) -> Result<PageLayout, ConfigError> {
        Ok(PageLayout::from_spans(resolve_geometry("layout", &self.layout)?))
    }

    /// Parses the countdown target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the target is not a timestamp.
    pub fn countdown_target(&self) -> Result<chrono::DateTime<chrono::Utc>, ConfigError> {
        countdown::parse_target(&self.countdown.target)
    }
}

/// Intro step offsets as humantime strings (`"1s"`, `"1500ms"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntroConfig {
    /// Phase 0 → 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Skip button appears
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_available: Option<String>,

    /// Phase 1 → 2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presents: Option<String>,

    /// Phase 2 → 3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wormhole: Option<String>,

    /// Completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<String>,
}

impl IntroConfig {
    /// Resolves each step, falling back to the default offset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first unparseable value.
    pub fn resolve(&self) -> Result<IntroTimings, ConfigError> {
        let defaults = IntroTimings::default();
        let step = |field: &str, value: Option<&String>, default: Duration| {
            value.map_or(Ok(default), |v| {
                parse_duration(&format!("intro.{field}"), v)
            })
        };

        Ok(IntroTimings {
            department: step("department", self.department.as_ref(), defaults.department)?,
            skip_available: step(
                "skip_available",
                self.skip_available.as_ref(),
                defaults.skip_available,
            )?,
            presents: step("presents", self.presents.as_ref(), defaults.presents)?,
            wormhole: step("wormhole", self.wormhole.as_ref(), defaults.wormhole)?,
            complete: step("complete", self.complete.as_ref(), defaults.complete)?,
        })
    }
}

/// Countdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountdownConfig {
    /// RFC 3339 or naive `YYYY-MM-DDTHH:MM:SS` (UTC)
    #[serde(default = "default_countdown_target")]
    pub target: String,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            target: default_countdown_target(),
        }
    }
}

fn default_countdown_target() -> String {
    DEFAULT_TARGET.to_owned()
}

/// One section's vertical placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionGeometry {
    /// Section id (`home`, `events`, ...)
    pub section: String,

    /// Top edge, from the top of the page
    pub start: f64,

    /// Rendered height
    pub height: f64,
}

// ============================================================================
// Scroll Traces
// ============================================================================

/// A recorded visit: scroll offsets at points in time after the page
/// mounted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrollTrace {
    /// Press skip at this point in the intro (humantime)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_at: Option<String>,

    /// Scroll ticks, in any order
    #[serde(default)]
    pub ticks: Vec<ScrollTick>,
}

/// One scroll event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrollTick {
    /// Time since the main view mounted (humantime)
    pub at: String,

    /// Vertical scroll offset
    pub offset: f64,

    /// Replaces the whole layout before this tick is delivered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayout: Option<Vec<SectionGeometry>>,
}

/// A trace tick with its fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTick {
    pub at: Duration,
    pub offset: f64,
    pub relayout: Option<Vec<(SectionId, SectionSpan)>>,
}

impl ScrollTrace {
    /// Resolves the skip time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unparseable duration.
    pub fn skip_at(&self) -> Result<Option<Duration>, ConfigError> {
        self.skip_at
            .as_deref()
            .map(|v| parse_duration("skip_at", v))
            .transpose()
    }

    /// Resolves every tick, sorted by time. Ties keep file order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a bad duration or section.
    pub fn resolved_ticks(&self) -> Result<Vec<ResolvedTick>, ConfigError> {
        let mut ticks = self
            .ticks
            .iter()
            .enumerate()
            .map(|(i, tick)| {
                Ok(ResolvedTick {
                    at: parse_duration(&format!("ticks[{i}].at"), &tick.at)?,
                    offset: tick.offset,
                    relayout: tick
                        .relayout
                        .as_deref()
                        .map(|g| resolve_geometry(&format!("ticks[{i}].relayout"), g))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        ticks.sort_by_key(|t| t.at);
        Ok(ticks)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Longest accepted timeline or trace offset.
pub const MAX_OFFSET: Duration = Duration::from_secs(24 * 60 * 60);

/// Parses a humantime duration for `field`, at most [`MAX_OFFSET`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the field.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |expected: String| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    };
    let duration = humantime::parse_duration(value.trim())
        .map_err(|e| invalid(format!("a duration like \"1s\" or \"1500ms\" ({e})")))?;
    if duration > MAX_OFFSET {
        return Err(invalid(format!(
            "a duration of at most {}",
            humantime::format_duration(MAX_OFFSET)
        )));
    }
    Ok(duration)
}

fn parse_section(field: &str, name: &str) -> Result<SectionId, ConfigError> {
    name.parse().map_err(|e: crate::scroll::ParseSectionError| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            expected: e.suggestion.map_or_else(
                || "one of home, events, timeline, rules, contact".to_string(),
                |s| format!("a section id (did you mean '{s}'?)"),
            ),
        }
    })
}

fn resolve_geometry(
    field: &str,
    geometry: &[SectionGeometry],
) -> Result<Vec<(SectionId, SectionSpan)>, ConfigError> {
    geometry
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let id = parse_section(&format!("{field}[{i}].section"), &g.section)?;
            Ok((id, SectionSpan::new(g.start, g.height)))
        })
        .collect()
}
