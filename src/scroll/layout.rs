//! Live section geometry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::section::{SectionId, SectionSpan};

/// Source of current section geometry.
///
/// Implementations must be side-effect free: the tracker queries every
/// section on every tick and relies on seeing the layout as it is *now*.
/// Returning `None` means the section is not on the page.
pub trait LayoutSource: Send + Sync {
    /// Returns the current span of `section`, if it is rendered.
    fn span(&self, section: SectionId) -> Option<SectionSpan>;
}

impl<T: LayoutSource + ?Sized> LayoutSource for Arc<T> {
    fn span(&self, section: SectionId) -> Option<SectionSpan> {
        (**self).span(section)
    }
}

impl LayoutSource for HashMap<SectionId, SectionSpan> {
    fn span(&self, section: SectionId) -> Option<SectionSpan> {
        self.get(&section).copied()
    }
}

/// Mutable page layout shared between the tracker and whatever reflows it.
///
/// Updates are visible on the tracker's next tick.
#[derive(Debug, Default)]
pub struct PageLayout {
    spans: RwLock<HashMap<SectionId, SectionSpan>>,
}

impl PageLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a layout from `(section, span)` pairs.
    #[must_use]
    pub fn from_spans(spans: impl IntoIterator<Item = (SectionId, SectionSpan)>) -> Self {
        Self {
            spans: RwLock::new(spans.into_iter().collect()),
        }
    }

    /// Stacks sections top to bottom starting at 0, each with the given height.
    #[must_use]
    pub fn stacked(sections: impl IntoIterator<Item = (SectionId, f64)>) -> Self {
        let mut top = 0.0;
        Self::from_spans(sections.into_iter().map(|(id, height)| {
            let span = SectionSpan::new(top, height);
            top += height;
            (id, span)
        }))
    }

    /// Sets or replaces the span of one section.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, section: SectionId, span: SectionSpan) {
        self.spans
            .write()
            .expect("layout lock poisoned")
            .insert(section, span);
    }

    /// Removes a section from the page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, section: SectionId) -> Option<SectionSpan> {
        self.spans
            .write()
            .expect("layout lock poisoned")
            .remove(&section)
    }

    /// Replaces the whole layout in one step (e.g. after a responsive reflow).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn replace(&self, spans: impl IntoIterator<Item = (SectionId, SectionSpan)>) {
        *self.spans.write().expect("layout lock poisoned") = spans.into_iter().collect();
    }
}

impl LayoutSource for PageLayout {
    fn span(&self, section: SectionId) -> Option<SectionSpan> {
        self.spans
            .read()
            .expect("layout lock poisoned")
            .get(&section)
            .copied()
    }
}
