//! Configuration validation
//!
//! Semantic checks on a deserialized `SiteConfig`. Validation collects ALL
//! issues rather than stopping at the first, so `tezas validate` can report
//! everything wrong with a file in one pass.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::schema::{SectionGeometry, SiteConfig, parse_duration};
use crate::countdown;
use crate::error::{Severity, ValidationIssue};
use crate::scroll::{SectionId, SectionSpan};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Site configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &SiteConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        let sections = self.validate_sections(&config.sections);
        self.validate_header_offset(config.header_offset);
        self.validate_intro(config);
        self.validate_countdown(&config.countdown.target);
        self.validate_layout(&config.layout, &sections);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// Checks the tracked section list. Returns the ids that parsed.
    fn validate_sections(&mut self, names: &[String]) -> Vec<SectionId> {
        if names.is_empty() {
            self.add_error("sections", "At least one section must be tracked");
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let path = format!("sections[{i}]");
            match name.parse::<SectionId>() {
                Ok(id) => {
                    if seen.insert(id) {
                        ids.push(id);
                    } else {
                        self.add_error(&path, &format!("Duplicate section '{name}'"));
                    }
                }
                Err(e) => self.add_error(&path, &e.to_string()),
            }
        }
        ids
    }

    fn validate_header_offset(&mut self, offset: f64) {
        if !offset.is_finite() || offset < 0.0 {
            self.add_error(
                "header_offset",
                &format!("Header offset must be a non-negative number, got {offset}"),
            );
        }
    }

    // ========================================================================
    // Intro Timeline
    // ========================================================================

    fn validate_intro(&mut self, config: &SiteConfig) {
        let defaults = crate::intro::IntroTimings::default();
        let intro = &config.intro;
        let mut step = |field: &str, value: Option<&String>, default: Duration| {
            value.map_or(Some(default), |v| {
                let path = format!("intro.{field}");
                match parse_duration(&path, v) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        self.add_error(&path, &e.to_string());
                        None
                    }
                }
            })
        };

        let department = step("department", intro.department.as_ref(), defaults.department);
        let skip = step(
            "skip_available",
            intro.skip_available.as_ref(),
            defaults.skip_available,
        );
        let presents = step("presents", intro.presents.as_ref(), defaults.presents);
        let wormhole = step("wormhole", intro.wormhole.as_ref(), defaults.wormhole);
        let complete = step("complete", intro.complete.as_ref(), defaults.complete);

        let ordered = [
            ("intro.department", department),
            ("intro.presents", presents),
            ("intro.wormhole", wormhole),
            ("intro.complete", complete),
        ];
        for pair in ordered.windows(2) {
            if let [(prev_name, Some(prev)), (name, Some(cur))] = pair {
                if cur <= prev {
                    self.add_error(
                        name,
                        &format!(
                            "Must be later than {prev_name} ({} <= {})",
                            humantime::format_duration(*cur),
                            humantime::format_duration(*prev)
                        ),
                    );
                }
            }
        }

        if let (Some(skip), Some(complete)) = (skip, complete) {
            if skip >= complete {
                self.add_error(
                    "intro.skip_available",
                    "Skip button would never appear before completion",
                );
            }
        }

        if department == Some(Duration::ZERO) {
            self.add_warning("intro.department", "Phase 1 starts immediately");
        }
    }

    // ========================================================================
    // Countdown
    // ========================================================================

    fn validate_countdown(&mut self, target: &str) {
        if let Err(e) = countdown::parse_target(target) {
            self.add_error("countdown.target", &e.to_string());
        }
    }

    // ========================================================================
    // Layout
    // ========================================================================

    fn validate_layout(&mut self, layout: &[SectionGeometry], tracked: &[SectionId]) {
        if layout.is_empty() {
            return;
        }

        let mut spans: Vec<(SectionId, SectionSpan)> = Vec::with_capacity(layout.len());
        for (i, geometry) in layout.iter().enumerate() {
            let path = format!("layout[{i}]");
            let id = match geometry.section.parse::<SectionId>() {
                Ok(id) => id,
                Err(e) => {
                    self.add_error(&format!("{path}.section"), &e.to_string());
                    continue;
                }
            };
            if spans.iter().any(|(seen, _)| *seen == id) {
                self.add_error(&path, &format!("Section '{id}' is laid out twice"));
                continue;
            }
            if !geometry.start.is_finite() || !geometry.height.is_finite() {
                self.add_error(&path, "Start and height must be finite");
                continue;
            }
            if geometry.height <= 0.0 {
                self.add_warning(
                    &format!("{path}.height"),
                    &format!("Section '{id}' has no height and can never become active"),
                );
            }
            spans.push((id, SectionSpan::new(geometry.start, geometry.height)));
        }

        for (i, (a, span_a)) in spans.iter().enumerate() {
            for (b, span_b) in &spans[i + 1..] {
                if span_a.overlaps(span_b) {
                    let (first, second) = first_declared(tracked, *a, *b);
                    self.add_warning(
                        "layout",
                        &format!("Sections '{first}' and '{second}' overlap; '{first}' wins"),
                    );
                }
            }
        }

        for id in tracked {
            if !spans.iter().any(|(laid_out, _)| laid_out == id) {
                self.add_warning(
                    "layout",
                    &format!("Tracked section '{id}' has no layout and will never become active"),
                );
            }
        }
    }

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Orders two sections by tracking priority. Untracked sections sort last.
fn first_declared(tracked: &[SectionId], a: SectionId, b: SectionId) -> (SectionId, SectionId) {
    let rank = |id| tracked.iter().position(|t| *t == id).unwrap_or(usize::MAX);
    if rank(b) < rank(a) { (b, a) } else { (a, b) }
}
