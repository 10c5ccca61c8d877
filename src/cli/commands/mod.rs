//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler and holds
//! the helpers the page commands share.

pub mod countdown;
pub mod intro;
pub mod track;
pub mod validate;
pub mod version;
pub mod visit;

use std::path::Path;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, ResolvedTick, SiteConfig};
use crate::error::{ConfigError, TezasError};
use crate::intro::sleep_until_offset;
use crate::observability::EventEmitter;
use crate::scroll::{PageLayout, ScrollFeed, SectionId};

/// Height given to each section when the config has no `layout`.
pub const DEFAULT_SECTION_HEIGHT: f64 = 800.0;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), TezasError> {
    if let Some(port) = cli.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    match cli.command {
        Commands::Visit(args) => visit::run(&args, event_emitter(cli.events_file.as_deref())?).await,
        Commands::Intro(args) => intro::run(&args, event_emitter(cli.events_file.as_deref())?).await,
        Commands::Track(args) => track::run(&args, event_emitter(cli.events_file.as_deref())?).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Countdown(args) => countdown::run(&args).await,
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

fn event_emitter(path: Option<&Path>) -> Result<Arc<EventEmitter>, TezasError> {
    let emitter = match path {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::stdout(),
    };
    Ok(Arc::new(emitter))
}

/// Loads the site config, or the built-in defaults when no path is given.
///
/// Validation warnings are logged.
///
/// # Errors
///
/// Returns a config error if the file is missing or invalid.
pub fn load_site_config(path: Option<&Path>) -> Result<SiteConfig, TezasError> {
    let Some(path) = path else {
        debug!("no site config given; using defaults");
        return Ok(SiteConfig::default());
    };

    info!(config = %path.display(), "loading site config");
    let result = ConfigLoader::with_defaults()
        .load_site(path)
        .inspect_err(|e| {
            if let ConfigError::ValidationError { errors, .. } = e {
                for issue in errors {
                    error!(location = %issue.path, "{}", issue.message);
                }
            }
        })?;
    for warning in &result.warnings {
        warn!(location = %warning.path, "{}", warning.message);
    }
    Ok(result.config)
}

/// Builds the page layout: the config's `layout`, or the tracked sections
/// stacked at [`DEFAULT_SECTION_HEIGHT`].
///
/// # Errors
///
/// Returns a config error for an unknown section in `layout`.
pub fn build_layout(config: &SiteConfig, sections: &[SectionId]) -> Result<PageLayout, TezasError> {
    if config.layout.is_empty() {
        return Ok(PageLayout::stacked(
            sections.iter().map(|&id| (id, DEFAULT_SECTION_HEIGHT)),
        ));
    }
    Ok(config.page_layout()?)
}

/// Delivers trace ticks to `feed` at their offsets from `start`, applying
/// any relayout first.
pub async fn replay_ticks(
    ticks: &[ResolvedTick],
    feed: &ScrollFeed,
    layout: &PageLayout,
    start: Instant,
) {
    for tick in ticks {
        sleep_until_offset(start, tick.at).await;
        if let Some(spans) = &tick.relayout {
            debug!(sections = spans.len(), "relayout");
            layout.replace(spans.iter().copied());
        }
        debug!(at_ms = tick.at.as_millis(), offset = tick.offset, "scroll");
        feed.scroll_to(tick.offset);
    }
}
