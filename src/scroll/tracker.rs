//! Scroll position → active section.

use crate::error::TrackerError;

use super::layout::LayoutSource;
use super::section::SectionId;

/// Height of the sticky navigation bar. Added to the scroll offset so the
/// probe sits just below the bar.
pub const HEADER_OFFSET: f64 = 80.0;

/// Tracks which section sits under the top edge of the viewport.
///
/// The tracker holds only the section order, the header offset, and the
/// currently active section. Geometry is read from a [`LayoutSource`] on
/// every call and never cached.
///
/// The first section starts active. When the probe falls outside every
/// span the previous section stays active, so there is never a "no
/// section" state.
#[derive(Debug, Clone)]
pub struct ScrollSectionTracker {
    sections: Vec<SectionId>,
    header_offset: f64,
    active: SectionId,
}

impl ScrollSectionTracker {
    /// Creates a tracker over `sections`, in priority order.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NoSections` for an empty list and
    /// `TrackerError::InvalidHeaderOffset` for a negative or non-finite
    /// offset.
    pub fn new(sections: Vec<SectionId>, header_offset: f64) -> Result<Self, TrackerError> {
        let Some(&first) = sections.first() else {
            return Err(TrackerError::NoSections);
        };
        if !header_offset.is_finite() || header_offset < 0.0 {
            return Err(TrackerError::InvalidHeaderOffset(header_offset));
        }
        Ok(Self {
            sections,
            header_offset,
            active: first,
        })
    }

    /// Tracker over the page's rendered sections with the standard header offset.
    #[must_use]
    pub fn for_page() -> Self {
        Self {
            sections: SectionId::PAGE.to_vec(),
            header_offset: HEADER_OFFSET,
            active: SectionId::PAGE[0],
        }
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    #[must_use]
    pub const fn header_offset(&self) -> f64 {
        self.header_offset
    }

    /// Currently active section.
    #[must_use]
    pub const fn active(&self) -> SectionId {
        self.active
    }

    /// Position used to decide which section is "under" the viewport top.
    #[must_use]
    pub fn probe(&self, scroll_offset: f64) -> f64 {
        scroll_offset + self.header_offset
    }

    /// Returns the first section, in priority order, whose current span
    /// contains `probe`. Missing sections are skipped.
    #[must_use]
    pub fn locate(&self, layout: &dyn LayoutSource, probe: f64) -> Option<SectionId> {
        self.sections
            .iter()
            .copied()
            .find(|&section| layout.span(section).is_some_and(|span| span.contains(probe)))
    }

    /// Tracked sections that `layout` currently has no span for.
    #[must_use]
    pub fn missing(&self, layout: &dyn LayoutSource) -> Vec<SectionId> {
        self.sections
            .iter()
            .copied()
            .filter(|&section| layout.span(section).is_none())
            .collect()
    }

    /// Recomputes the active section for `scroll_offset`.
    ///
    /// Returns the newly active section when it changed, `None` otherwise.
    pub fn observe(&mut self, layout: &dyn LayoutSource, scroll_offset: f64) -> Option<SectionId> {
        let probe = self.probe(scroll_offset);
        match self.locate(layout, probe) {
            Some(section) if section != self.active => {
                self.active = section;
                Some(section)
            }
            _ => None,
        }
    }
}
