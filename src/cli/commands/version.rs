//! `tezas version`

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::countdown::DEFAULT_TARGET;

/// Prints the package version and the event it counts down to.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => println!("{name} {version} (symposium starts {DEFAULT_TARGET})"),
        OutputFormat::Json => println!(
            "{}",
            json!({
                "name": name,
                "version": version,
                "description": env!("CARGO_PKG_DESCRIPTION"),
                "symposium_start": DEFAULT_TARGET,
            })
        ),
    }
}
