//! Countdown to the symposium start shown in the hero banner.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::ConfigError;

/// Symposium start, as written on the site.
pub const DEFAULT_TARGET: &str = "2026-02-09T00:00:00";

const TARGET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a countdown target.
///
/// Accepts RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS`, which is taken as UTC.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if `value` matches neither form.
pub fn parse_target(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, TARGET_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ConfigError::InvalidValue {
            field: "countdown.target".to_string(),
            value: value.to_string(),
            expected: "RFC 3339 or YYYY-MM-DDTHH:MM:SS".to_string(),
        })
}

/// Time remaining, broken into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Time left from `now` until `target`, or `None` once it has passed.
    #[must_use]
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let diff = target.signed_duration_since(now);
        if diff <= TimeDelta::zero() {
            return None;
        }
        let total = diff.num_seconds();
        Some(Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        })
    }

    /// `(value, label)` pairs in display order.
    #[must_use]
    pub const fn segments(&self) -> [(i64, &'static str); 4] {
        [
            (self.days, "DAYS"),
            (self.hours, "HOURS"),
            (self.minutes, "MINS"),
            (self.seconds, "SECS"),
        ]
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (value, label)) in self.segments().into_iter().enumerate() {
            if i > 0 {
                f.write_str(" : ")?;
            }
            write!(f, "{value:02} {label}")?;
        }
        Ok(())
    }
}

/// Countdown display state.
///
/// Once the target passes, the last displayed value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    target: DateTime<Utc>,
    display: TimeLeft,
}

impl Countdown {
    #[must_use]
    pub const fn new(target: DateTime<Utc>) -> Self {
        Self {
            target,
            display: TimeLeft::ZERO,
        }
    }

    #[must_use]
    pub const fn target(&self) -> DateTime<Utc> {
        self.target
    }

    #[must_use]
    pub const fn display(&self) -> TimeLeft {
        self.display
    }

    /// Recomputes the display for `now`. Returns `false` once the target
    /// has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match TimeLeft::until(self.target, now) {
            Some(left) => {
                self.display = left;
                true
            }
            None => false,
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        // DEFAULT_TARGET is a fixed literal in TARGET_FORMAT.
        let target = NaiveDateTime::parse_from_str(DEFAULT_TARGET, TARGET_FORMAT)
            .map(|naive| naive.and_utc())
            .unwrap_or_default();
        Self::new(target)
    }
}
