//! The host page
//!
//! Composes the intro and the scroll tracker the way the site's root
//! component does: the session flag is read once at mount; the intro runs
//! only if it is unset; completion writes the flag and swaps in the main
//! view, which mounts the tracker. Unmounting tears down whichever is live.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::error::{TezasError, TrackerError};
use crate::intro::{IntroHandle, IntroSequencer, IntroStatus, IntroTimings};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};
use crate::scroll::{
    HEADER_OFFSET, LayoutSource, ScrollFeed, ScrollSectionTracker, ScrollSubscription, SectionId,
};
use crate::session::{self, SessionStore};

/// Which top-level view is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The intro overlay.
    Intro,
    /// The main document with navigation.
    Main,
}

/// Settings for one page mount.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Tracked sections, in priority order.
    pub sections: Vec<SectionId>,
    /// Sticky header height.
    pub header_offset: f64,
    /// Intro timeline.
    pub timings: IntroTimings,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            sections: SectionId::PAGE.to_vec(),
            header_offset: HEADER_OFFSET,
            timings: IntroTimings::default(),
        }
    }
}

impl PageOptions {
    /// Resolves options from a loaded site config.
    ///
    /// # Errors
    ///
    /// Returns `TezasError::Config` if a section name or duration does not
    /// resolve.
    pub fn from_config(config: &SiteConfig) -> Result<Self, TezasError> {
        Ok(Self {
            sections: config.section_ids()?,
            header_offset: config.header_offset,
            timings: config.intro_timings()?,
        })
    }
}

/// A mounted page.
///
/// Must be created inside a tokio runtime. Dropping the page unmounts it.
pub struct HostPage {
    visit_id: Uuid,
    intro: Option<IntroSequencer>,
    intro_handle: Option<IntroHandle>,
    state: Arc<Mutex<PageState>>,
    view: watch::Receiver<View>,
    emitter: Arc<EventEmitter>,
}

struct PageState {
    unmounted: bool,
    view: watch::Sender<View>,
    pending: Option<PendingTracker>,
    tracker: Option<ScrollSubscription>,
}

/// Everything needed to mount the tracker once the main view appears.
struct PendingTracker {
    tracker: ScrollSectionTracker,
    layout: Arc<dyn LayoutSource>,
    feed: ScrollFeed,
    emitter: Arc<EventEmitter>,
}

impl PageState {
    fn enter_main(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.tracker = Some(ScrollSubscription::start(
                pending.tracker,
                pending.layout,
                &pending.feed,
                pending.emitter,
            ));
        }
        self.view.send_replace(View::Main);
    }
}

impl fmt::Debug for HostPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostPage")
            .field("visit_id", &self.visit_id)
            .field("view", &*self.view.borrow())
            .field("intro", &self.intro)
            .finish_non_exhaustive()
    }
}

impl HostPage {
    /// Mounts the page.
    ///
    /// Reads the session flag once. If it is unset the intro starts and the
    /// tracker mounts on completion; otherwise the tracker mounts
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if `options` has no sections or a bad
    /// header offset.
    pub fn mount(
        options: &PageOptions,
        store: Arc<dyn SessionStore>,
        layout: Arc<dyn LayoutSource>,
        feed: &ScrollFeed,
        emitter: Arc<EventEmitter>,
    ) -> Result<Self, TrackerError> {
        let tracker = ScrollSectionTracker::new(options.sections.clone(), options.header_offset)?;
        let visit_id = Uuid::new_v4();
        let already_shown = session::intro_shown(store.as_ref());

        info!(%visit_id, intro_already_shown = already_shown, "page mounted");
        emitter.emit(Event::PageMounted {
            timestamp: Utc::now(),
            visit_id,
            intro_already_shown: already_shown,
        });

        let initial = if already_shown { View::Main } else { View::Intro };
        let (view_tx, view) = watch::channel(initial);
        let state = Arc::new(Mutex::new(PageState {
            unmounted: false,
            view: view_tx,
            pending: Some(PendingTracker {
                tracker,
                layout,
                feed: feed.clone(),
                emitter: Arc::clone(&emitter),
            }),
            tracker: None,
        }));

        let mut page = Self {
            visit_id,
            intro: None,
            intro_handle: None,
            state: Arc::clone(&state),
            view,
            emitter: Arc::clone(&emitter),
        };

        if already_shown {
            metrics::record_intro_bypassed();
            debug!("intro already shown this session; entering main view");
            state.lock().expect("page state lock poisoned").enter_main();
            return Ok(page);
        }

        let on_complete = move || {
            let mut state = state.lock().expect("page state lock poisoned");
            if state.unmounted {
                return;
            }
            if let Err(e) = session::mark_intro_shown(store.as_ref()) {
                warn!(error = %e, "failed to persist intro flag");
            }
            state.enter_main();
        };
        let intro = IntroSequencer::start_with_events(&options.timings, emitter, on_complete);
        page.intro_handle = Some(intro.handle());
        page.intro = Some(intro);
        Ok(page)
    }

    #[must_use]
    pub const fn visit_id(&self) -> Uuid {
        self.visit_id
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> View {
        *self.view.borrow()
    }

    /// Subscribes to view changes.
    #[must_use]
    pub fn subscribe_view(&self) -> watch::Receiver<View> {
        self.view.clone()
    }

    /// Status of the intro, or `None` if it was bypassed.
    #[must_use]
    pub fn intro_status(&self) -> Option<IntroStatus> {
        self.intro_handle.as_ref().map(IntroHandle::status)
    }

    /// Presses the skip button. Returns `true` if this ended the intro.
    pub fn skip_intro(&self) -> bool {
        self.intro_handle.as_ref().is_some_and(IntroHandle::skip)
    }

    /// Active section, once the main view has mounted the tracker.
    ///
    /// # Panics
    ///
    /// Panics if the page state lock is poisoned.
    #[must_use]
    pub fn active_section(&self) -> Option<SectionId> {
        self.state
            .lock()
            .expect("page state lock poisoned")
            .tracker
            .as_ref()
            .map(ScrollSubscription::active)
    }

    /// Subscribes to the active section, once the tracker is mounted.
    ///
    /// # Panics
    ///
    /// Panics if the page state lock is poisoned.
    #[must_use]
    pub fn subscribe_active(&self) -> Option<watch::Receiver<SectionId>> {
        self.state
            .lock()
            .expect("page state lock poisoned")
            .tracker
            .as_ref()
            .map(ScrollSubscription::subscribe)
    }

    /// Returns `true` while any intro timer or scroll listener is live.
    ///
    /// # Panics
    ///
    /// Panics if the page state lock is poisoned.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        let timers = self
            .intro
            .as_ref()
            .is_some_and(IntroSequencer::has_pending_timers);
        let listening = self
            .state
            .lock()
            .expect("page state lock poisoned")
            .tracker
            .as_ref()
            .is_some_and(ScrollSubscription::is_listening);
        timers || listening
    }

    /// Tears down the intro and the tracker. Idempotent.
    ///
    /// # Panics
    ///
    /// Panics if the page state lock is poisoned.
    pub fn unmount(&mut self) {
        if let Some(mut tracker) = self.detach() {
            tracker.stop();
        }
    }

    /// Unmounts and waits for the scroll listener to finish, so its final
    /// events are written before this returns.
    ///
    /// # Panics
    ///
    /// Panics if the page state lock is poisoned.
    pub async fn close(mut self) {
        if let Some(tracker) = self.detach() {
            tracker.shutdown().await;
        }
    }

    /// Marks the page unmounted and hands back the tracker, if mounted.
    fn detach(&mut self) -> Option<ScrollSubscription> {
        if let Some(mut intro) = self.intro.take() {
            intro.teardown();
        }

        let mut state = self.state.lock().expect("page state lock poisoned");
        if state.unmounted {
            return None;
        }
        state.unmounted = true;
        state.pending = None;
        let tracker = state.tracker.take();
        drop(state);

        info!(visit_id = %self.visit_id, "page unmounted");
        self.emitter.emit(Event::PageUnmounted {
            timestamp: Utc::now(),
            visit_id: self.visit_id,
        });
        tracker
    }
}

impl Drop for HostPage {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{FRAME, PageLayout};
    use crate::session::{INTRO_SHOWN_KEY, MemorySessionStore};
    use std::time::Duration;

    fn layout() -> Arc<PageLayout> {
        Arc::new(PageLayout::stacked([
            (SectionId::Home, 800.0),
            (SectionId::Events, 800.0),
            (SectionId::Timeline, 800.0),
            (SectionId::Contact, 800.0),
        ]))
    }

    fn mount(store: &Arc<MemorySessionStore>, feed: &ScrollFeed) -> HostPage {
        HostPage::mount(
            &PageOptions::default(),
            Arc::clone(store) as Arc<dyn SessionStore>,
            layout(),
            feed,
            Arc::new(EventEmitter::noop()),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_visit_plays_intro_then_tracks() {
        let store = Arc::new(MemorySessionStore::new());
        let feed = ScrollFeed::new();
        let page = mount(&store, &feed);

        assert_eq!(page.view(), View::Intro);
        assert_eq!(page.active_section(), None);
        assert_eq!(feed.listener_count(), 0);

        tokio::time::sleep(Duration::from_millis(6001)).await;
        assert_eq!(page.view(), View::Main);
        assert_eq!(store.get(INTRO_SHOWN_KEY).as_deref(), Some("true"));
        assert_eq!(page.active_section(), Some(SectionId::Home));
        assert_eq!(feed.listener_count(), 1);

        feed.scroll_to(750.0);
        tokio::time::sleep(FRAME * 3).await;
        assert_eq!(page.active_section(), Some(SectionId::Events));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flag_set_bypasses_intro() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(INTRO_SHOWN_KEY, "true").unwrap();
        let feed = ScrollFeed::new();
        let page = mount(&store, &feed);

        assert_eq!(page.view(), View::Main);
        assert_eq!(page.intro_status(), None);
        assert!(!page.skip_intro());
        assert_eq!(page.active_section(), Some(SectionId::Home));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_mounts_tracker_immediately() {
        let store = Arc::new(MemorySessionStore::new());
        let feed = ScrollFeed::new();
        let page = mount(&store, &feed);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(page.skip_intro());
        assert_eq!(page.view(), View::Main);
        assert!(page.active_section().is_some());
        assert!(!page.skip_intro());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_during_intro_leaves_nothing_running() {
        let store = Arc::new(MemorySessionStore::new());
        let feed = ScrollFeed::new();
        let mut page = mount(&store, &feed);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        page.unmount();
        page.unmount();
        assert!(!page.has_pending_work());
        assert_eq!(feed.listener_count(), 0);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(page.view(), View::Intro);
        assert!(store.get(INTRO_SHOWN_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_while_tracking_releases_listener() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(INTRO_SHOWN_KEY, "true").unwrap();
        let feed = ScrollFeed::new();
        let page = mount(&store, &feed);
        assert!(page.has_pending_work());

        drop(page);
        tokio::time::sleep(FRAME * 3).await;
        assert_eq!(feed.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_sections_rejected() {
        let options = PageOptions {
            sections: vec![],
            ..PageOptions::default()
        };
        let feed = ScrollFeed::new();
        let result = HostPage::mount(
            &options,
            Arc::new(MemorySessionStore::new()),
            layout(),
            &feed,
            Arc::new(EventEmitter::noop()),
        );
        assert!(matches!(result, Err(TrackerError::NoSections)));
    }
}
