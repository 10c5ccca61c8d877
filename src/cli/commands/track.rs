//! `tezas track`: replay a scroll trace against the section tracker.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::cli::args::TrackArgs;
use crate::config::ConfigLoader;
use crate::error::TezasError;
use crate::observability::EventEmitter;
use crate::scroll::{
    FRAME, LayoutSource, NavigationState, ScrollFeed, ScrollSectionTracker, ScrollSubscription,
};

use super::{build_layout, load_site_config, replay_ticks};

/// Mounts a tracker, replays the trace, and reports the navigation state
/// the bar would show after each tick.
///
/// # Errors
///
/// Returns an error if the config or trace cannot be loaded, or the
/// section list is empty.
pub async fn run(args: &TrackArgs, emitter: Arc<EventEmitter>) -> Result<(), TezasError> {
    let config = load_site_config(args.config.as_deref())?;
    let sections = config.section_ids()?;
    let tracker = ScrollSectionTracker::new(sections.clone(), config.header_offset)?;
    let layout = Arc::new(build_layout(&config, &sections)?);
    let ticks = ConfigLoader::with_defaults()
        .load_trace(&args.trace)?
        .resolved_ticks()?;

    let feed = ScrollFeed::new();
    let subscription = ScrollSubscription::start(
        tracker,
        Arc::clone(&layout) as Arc<dyn LayoutSource>,
        &feed,
        emitter,
    );
    let mut active = subscription.subscribe();
    let Some(mut nav) = NavigationState::new(sections, config.header_offset) else {
        return Err(crate::error::TrackerError::NoSections.into());
    };

    let replay = replay_ticks(&ticks, &feed, &layout, Instant::now());
    tokio::pin!(replay);
    loop {
        tokio::select! {
            () = &mut replay => break,
            changed = active.changed() => {
                if changed.is_err() {
                    break;
                }
                nav.on_scroll(feed.offset(), *active.borrow_and_update());
                debug!(active = %nav.active(), scrolled = nav.scrolled(), "nav updated");
            }
        }
    }
    tokio::time::sleep(FRAME * 2).await;
    nav.on_scroll(feed.offset(), subscription.active());

    info!(
        active = %nav.active(),
        scrolled = nav.scrolled(),
        offset = feed.offset(),
        "trace finished"
    );
    subscription.shutdown().await;
    Ok(())
}
