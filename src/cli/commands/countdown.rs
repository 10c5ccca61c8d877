//! `tezas countdown`: the hero banner's time-left display.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::cli::args::{CountdownArgs, OutputFormat};
use crate::countdown::{self, Countdown};
use crate::error::TezasError;

use super::load_site_config;

const TICK: Duration = Duration::from_secs(1);

/// Prints the time left, once or (with `--watch`) every second until the
/// target passes.
///
/// # Errors
///
/// Returns a config error for an unparseable target or `--now`.
pub async fn run(args: &CountdownArgs) -> Result<(), TezasError> {
    let target = match &args.target {
        Some(target) => countdown::parse_target(target)?,
        None => load_site_config(args.config.as_deref())?.countdown_target()?,
    };
    let mut countdown = Countdown::new(target);

    if !args.watch {
        let now = match &args.now {
            Some(now) => countdown::parse_target(now)?,
            None => Utc::now(),
        };
        let running = countdown.tick(now);
        print(&countdown, running, now, args.format)?;
        return Ok(());
    }

    let mut interval = tokio::time::interval(TICK);
    loop {
        interval.tick().await;
        let now = Utc::now();
        let running = countdown.tick(now);
        print(&countdown, running, now, args.format)?;
        if !running {
            return Ok(());
        }
    }
}

fn print(
    countdown: &Countdown,
    running: bool,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<(), TezasError> {
    let left = countdown.display();
    match format {
        OutputFormat::Human => println!("{left}"),
        OutputFormat::Json => {
            let value = json!({
                "target": countdown.target().to_rfc3339(),
                "now": now.to_rfc3339(),
                "running": running,
                "days": left.days,
                "hours": left.hours,
                "minutes": left.minutes,
                "seconds": left.seconds,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
