//! `tezas validate`: check site configuration files.

use serde_json::json;
use tracing::info;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, TezasError, ValidationIssue};

/// Outcome for one file.
struct FileReport {
    path: String,
    errors: Vec<String>,
    warnings: Vec<ValidationIssue>,
}

impl FileReport {
    fn is_valid(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

/// Validates every file and prints a report.
///
/// All files are checked even after a failure.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` if any file fails (or, with
/// `--strict`, has warnings).
pub fn run(args: &ValidateArgs) -> Result<(), TezasError> {
    let loader = ConfigLoader::with_defaults();
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| {
            info!(file = %path.display(), "validating configuration");
            let path_str = path.display().to_string();
            match loader.load_site(path) {
                Ok(result) => FileReport {
                    path: path_str,
                    errors: Vec::new(),
                    warnings: result.warnings,
                },
                Err(ConfigError::ValidationError { errors, .. }) => FileReport {
                    path: path_str,
                    errors: errors.iter().map(ToString::to_string).collect(),
                    warnings: Vec::new(),
                },
                Err(e) => FileReport {
                    path: path_str,
                    errors: vec![e.to_string()],
                    warnings: Vec::new(),
                },
            }
        })
        .collect();

    match args.format {
        OutputFormat::Human => print_human(&reports, args.strict),
        OutputFormat::Json => print_json(&reports, args.strict)?,
    }

    let failed: Vec<&FileReport> = reports.iter().filter(|r| !r.is_valid(args.strict)).collect();
    if failed.is_empty() {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        path: failed
            .iter()
            .map(|r| r.path.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        errors: Vec::new(),
    }
    .into())
}

fn print_human(reports: &[FileReport], strict: bool) {
    for report in reports {
        let mark = if report.is_valid(strict) { "ok" } else { "FAIL" };
        println!("{mark}: {}", report.path);
        for error in &report.errors {
            println!("  {error}");
        }
        for warning in &report.warnings {
            println!("  {warning}");
        }
    }
}

fn print_json(reports: &[FileReport], strict: bool) -> Result<(), TezasError> {
    let value: Vec<_> = reports
        .iter()
        .map(|r| {
            json!({
                "path": r.path,
                "valid": r.is_valid(strict),
                "errors": r.errors,
                "warnings": r.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
