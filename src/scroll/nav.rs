//! Navigation bar state derived from the scroll position.

use super::layout::LayoutSource;
use super::section::SectionId;

/// Scroll offset beyond which the bar switches to its compact style.
pub const SCROLLED_THRESHOLD: f64 = 50.0;

/// State behind the sticky navigation bar.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    items: Vec<SectionId>,
    active: SectionId,
    scrolled: bool,
    menu_open: bool,
    header_offset: f64,
}

impl NavigationState {
    /// Creates a bar listing `items` above a header `header_offset` tall.
    /// The first item starts active.
    ///
    /// Returns `None` for an empty item list.
    #[must_use]
    pub fn new(items: Vec<SectionId>, header_offset: f64) -> Option<Self> {
        let active = *items.first()?;
        Some(Self {
            items,
            active,
            scrolled: false,
            menu_open: false,
            header_offset,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[SectionId] {
        &self.items
    }

    #[must_use]
    pub const fn active(&self) -> SectionId {
        self.active
    }

    #[must_use]
    pub const fn scrolled(&self) -> bool {
        self.scrolled
    }

    #[must_use]
    pub const fn menu_open(&self) -> bool {
        self.menu_open
    }

    #[must_use]
    pub const fn header_offset(&self) -> f64 {
        self.header_offset
    }

    /// Applies a scroll event and the tracker's current active section.
    pub fn on_scroll(&mut self, scroll_offset: f64, active: SectionId) {
        self.scrolled = scroll_offset > SCROLLED_THRESHOLD;
        self.active = active;
    }

    /// Offset to scroll to so `section` lands just below the bar.
    ///
    /// `None` when the section is not on the page.
    #[must_use]
    pub fn scroll_target(&self, section: SectionId, layout: &dyn LayoutSource) -> Option<f64> {
        layout
            .span(section)
            .map(|span| (span.start - self.header_offset).max(0.0))
    }

    /// Handles a click on a nav item: closes the mobile menu and returns the
    /// offset to scroll to.
    pub fn navigate(&mut self, section: SectionId, layout: &dyn LayoutSource) -> Option<f64> {
        self.menu_open = false;
        self.scroll_target(section, layout)
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }
}
