//! Intro phases and the views derived from them.

use std::fmt;

/// Step in the intro's timed progression.
///
/// Phases only move forward: 0 → 1 → 2 → 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum IntroPhase {
    /// Starfield fades in.
    #[default]
    Stars = 0,
    /// Department name reveals word by word.
    Department = 1,
    /// "PRESENTS" banner joins the department text.
    Presents = 2,
    /// Wormhole transition into the main page.
    Wormhole = 3,
}

impl IntroPhase {
    /// All phases in order.
    pub const ALL: [Self; 4] = [Self::Stars, Self::Department, Self::Presents, Self::Wormhole];

    /// Returns the phase index (0..=3).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the phase for `index`, or `None` above 3.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Stars),
            1 => Some(Self::Department),
            2 => Some(Self::Presents),
            3 => Some(Self::Wormhole),
            _ => None,
        }
    }

    /// Returns a stable lowercase name, used for logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stars => "stars",
            Self::Department => "department",
            Self::Presents => "presents",
            Self::Wormhole => "wormhole",
        }
    }
}

impl fmt::Display for IntroPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.name())
    }
}

/// How the intro reached completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionPath {
    /// The completion timer fired.
    Natural,
    /// The viewer (or the host, programmatically) skipped.
    Skipped,
}

impl CompletionPath {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Skipped => "skipped",
        }
    }
}

/// Observable state of an intro sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroStatus {
    /// Timers are still pending.
    Running {
        /// Current phase.
        phase: IntroPhase,
        /// Whether the skip affordance is shown.
        skip_available: bool,
    },
    /// Completion has fired. Terminal.
    Completed {
        /// Phase reached when completion fired.
        phase: IntroPhase,
        /// Which path completed the intro.
        path: CompletionPath,
    },
}

impl IntroStatus {
    /// Phase 0 with no skip affordance.
    pub const INITIAL: Self = Self::Running {
        phase: IntroPhase::Stars,
        skip_available: false,
    };

    /// Returns the current (or final) phase.
    #[must_use]
    pub const fn phase(&self) -> IntroPhase {
        match *self {
            Self::Running { phase, .. } | Self::Completed { phase, .. } => phase,
        }
    }

    /// Returns `true` once completion has fired.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Returns the overlays to draw for this status.
    ///
    /// A completed intro is unmounted, so it draws nothing.
    #[must_use]
    pub const fn layers(&self) -> IntroLayers {
        match *self {
            Self::Running {
                phase,
                skip_available,
            } => IntroLayers::for_phase(phase, skip_available),
            Self::Completed { .. } => IntroLayers::HIDDEN,
        }
    }
}

impl Default for IntroStatus {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Which intro overlays are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct IntroLayers {
    /// Starfield and deep-space gradient.
    pub starfield: bool,
    /// Department name text.
    pub department_text: bool,
    /// "PRESENTS" banner.
    pub presents_banner: bool,
    /// Wormhole transition.
    pub wormhole: bool,
    /// Skip button.
    pub skip_button: bool,
}

impl IntroLayers {
    /// Nothing drawn.
    pub const HIDDEN: Self = Self {
        starfield: false,
        department_text: false,
        presents_banner: false,
        wormhole: false,
        skip_button: false,
    };

    /// Overlay visibility for a running intro.
    #[must_use]
    pub const fn for_phase(phase: IntroPhase, skip_available: bool) -> Self {
        let wormhole = matches!(phase, IntroPhase::Wormhole);
        Self {
            starfield: true,
            department_text: matches!(phase, IntroPhase::Department | IntroPhase::Presents),
            presents_banner: matches!(phase, IntroPhase::Presents),
            wormhole,
            skip_button: skip_available && !wormhole,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(IntroPhase::Stars < IntroPhase::Department);
        assert!(IntroPhase::Department < IntroPhase::Presents);
        assert!(IntroPhase::Presents < IntroPhase::Wormhole);
    }

    #[test]
    fn test_index_round_trip() {
        for phase in IntroPhase::ALL {
            assert_eq!(IntroPhase::from_index(phase.index()), Some(phase));
        }
        assert_eq!(IntroPhase::from_index(4), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(IntroPhase::Presents.to_string(), "2 (presents)");
    }

    #[test]
    fn test_layers_phase_zero() {
        let layers = IntroLayers::for_phase(IntroPhase::Stars, false);
        assert!(layers.starfield);
        assert!(!layers.department_text);
        assert!(!layers.presents_banner);
        assert!(!layers.wormhole);
        assert!(!layers.skip_button);
    }

    #[test]
    fn test_layers_department_with_skip() {
        let layers = IntroLayers::for_phase(IntroPhase::Department, true);
        assert!(layers.department_text);
        assert!(!layers.presents_banner);
        assert!(layers.skip_button);
    }

    #[test]
    fn test_layers_presents_shows_both_texts() {
        let layers = IntroLayers::for_phase(IntroPhase::Presents, true);
        assert!(layers.department_text);
        assert!(layers.presents_banner);
        assert!(!layers.wormhole);
    }

    #[test]
    fn test_layers_wormhole_hides_text_and_skip() {
        let layers = IntroLayers::for_phase(IntroPhase::Wormhole, true);
        assert!(layers.starfield);
        assert!(!layers.department_text);
        assert!(!layers.presents_banner);
        assert!(layers.wormhole);
        assert!(!layers.skip_button);
    }

    #[test]
    fn test_completed_status_draws_nothing() {
        let status = IntroStatus::Completed {
            phase: IntroPhase::Wormhole,
            path: CompletionPath::Natural,
        };
        assert_eq!(status.layers(), IntroLayers::HIDDEN);
        assert!(status.is_completed());
        assert_eq!(status.phase(), IntroPhase::Wormhole);
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(IntroStatus::default(), IntroStatus::INITIAL);
        assert_eq!(IntroStatus::INITIAL.phase(), IntroPhase::Stars);
        assert!(!IntroStatus::INITIAL.is_completed());
    }
}
