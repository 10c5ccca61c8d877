//! `tezas visit`: one page load from mount to unmount.

use std::future;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::cli::args::VisitArgs;
use crate::config::{ConfigLoader, ScrollTrace};
use crate::error::TezasError;
use crate::intro::sleep_until_offset;
use crate::observability::EventEmitter;
use crate::page::{HostPage, PageOptions, View};
use crate::scroll::{FRAME, LayoutSource, ScrollFeed};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};

use super::{build_layout, load_site_config, replay_ticks};

/// Mounts the page, waits for the main view (skipping the intro if asked),
/// replays the scroll trace, and unmounts.
///
/// # Errors
///
/// Returns an error if the config, trace, or session file cannot be
/// loaded.
pub async fn run(args: &VisitArgs, emitter: Arc<EventEmitter>) -> Result<(), TezasError> {
    let config = load_site_config(args.config.as_deref())?;
    let options = PageOptions::from_config(&config)?;
    let layout = Arc::new(build_layout(&config, &options.sections)?);

    let trace = match &args.trace {
        Some(path) => ConfigLoader::with_defaults().load_trace(path)?,
        None => ScrollTrace::default(),
    };
    let ticks = trace.resolved_ticks()?;
    let skip_at = match args.skip_at {
        Some(at) => Some(at),
        None => trace.skip_at()?,
    };

    let store: Arc<dyn SessionStore> = match &args.session {
        Some(path) => Arc::new(FileSessionStore::open(path)?),
        None => Arc::new(MemorySessionStore::new()),
    };

    let feed = ScrollFeed::new();
    let mounted_at = Instant::now();
    let page = HostPage::mount(
        &options,
        store,
        Arc::clone(&layout) as Arc<dyn LayoutSource>,
        &feed,
        emitter,
    )?;

    let mut view = page.subscribe_view();
    let skip = async {
        match skip_at {
            Some(at) => sleep_until_offset(mounted_at, at).await,
            None => future::pending().await,
        }
    };
    tokio::pin!(skip);
    let mut skipped = false;

    while *view.borrow_and_update() == View::Intro {
        tokio::select! {
            () = &mut skip, if !skipped => {
                skipped = true;
                info!("skip pressed");
                page.skip_intro();
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    let main_at = Instant::now();
    replay_ticks(&ticks, &feed, &layout, main_at).await;
    // let the last tick clear the frame throttle
    tokio::time::sleep(FRAME * 2).await;

    info!(
        intro = ?page.intro_status(),
        active = ?page.active_section(),
        "visit finished"
    );
    page.close().await;
    Ok(())
}
