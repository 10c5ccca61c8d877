//! `tezas intro`: play the intro sequence alone.

use std::future;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::info;

use crate::cli::args::IntroArgs;
use crate::error::TezasError;
use crate::intro::{IntroSequencer, sleep_until_offset};
use crate::observability::EventEmitter;

use super::load_site_config;

/// Runs the intro until it completes, naturally or by `--skip-at`.
///
/// # Errors
///
/// Returns an error if the site config cannot be loaded.
pub async fn run(args: &IntroArgs, emitter: Arc<EventEmitter>) -> Result<(), TezasError> {
    let config = load_site_config(args.config.as_deref())?;
    let timings = config.intro_timings()?;

    let (done_tx, mut done) = oneshot::channel();
    let started_at = Instant::now();
    let sequencer = IntroSequencer::start_with_events(&timings, emitter, move || {
        let _ = done_tx.send(());
    });

    let skip = async {
        match args.skip_at {
            Some(at) => sleep_until_offset(started_at, at).await,
            None => future::pending().await,
        }
    };

    tokio::select! {
        _ = &mut done => {}
        () = skip => {
            sequencer.skip();
            let _ = done.await;
        }
    }

    info!(status = ?sequencer.status(), "intro finished");
    Ok(())
}
