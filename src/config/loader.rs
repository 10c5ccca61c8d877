//! Configuration loader
//!
//! Reads a YAML file, enforces a size limit, deserializes it into a typed
//! document, and (for site configs) runs the validator. Parse errors carry
//! the line number reported by `serde_yaml`.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::schema::{ScrollTrace, SiteConfig};
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Environment variable overriding [`ConfigLimits::max_config_size`].
pub const MAX_CONFIG_SIZE_ENV: &str = "TEZAS_MAX_CONFIG_SIZE";

/// Limits applied before parsing.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or(MAX_CONFIG_SIZE_ENV, 1024 * 1024),
        }
    }
}

/// A loaded site configuration plus any validation warnings.
#[derive(Debug)]
pub struct LoadResult {
    /// The validated configuration.
    pub config: SiteConfig,

    /// Warnings that did not prevent loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Loads site configs and scroll traces from disk.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates a site configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, the YAML does
    /// not parse, or validation reports any error.
    pub fn load_site(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let config: SiteConfig = self.load_document(path)?;

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        debug!(
            path = %path.display(),
            sections = config.sections.len(),
            warnings = result.warnings.len(),
            "site config loaded"
        );
        Ok(LoadResult {
            config,
            warnings: result.warnings,
        })
    }

    /// Loads a scroll trace.
    ///
    /// Ticks are resolved eagerly so a bad duration or section name fails
    /// here rather than mid-replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, or the trace
    /// does not parse.
    pub fn load_trace(&self, path: &Path) -> Result<ScrollTrace, ConfigError> {
        let trace: ScrollTrace = self.load_document(path)?;
        trace.skip_at()?;
        trace.resolved_ticks()?;
        debug!(path = %path.display(), ticks = trace.ticks.len(), "scroll trace loaded");
        Ok(trace)
    }

    /// Parses a site config from a string, validating it.
    ///
    /// # Errors
    ///
    /// Same as [`load_site`](Self::load_site), minus the file checks.
    pub fn parse_site(&self, source: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let config: SiteConfig = parse_yaml(source, origin)?;
        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }
        Ok(LoadResult {
            config,
            warnings: result.warnings,
        })
    }

    fn load_document<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.limits.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.limits.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        parse_yaml(&raw, path)
    }
}

/// Parses YAML, treating an empty document as the type's default.
fn parse_yaml<T: DeserializeOwned + Default>(raw: &str, path: &Path) -> Result<T, ConfigError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_site() {
        let file = write("sections: [home, events]\nheader_offset: 64\n");
        let result = ConfigLoader::with_defaults().load_site(file.path()).unwrap();
        assert_eq!(result.config.sections, vec!["home", "events"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = write("");
        let result = ConfigLoader::with_defaults().load_site(file.path()).unwrap();
        assert_eq!(result.config.sections.len(), 4);
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::with_defaults()
            .load_site(Path::new("/nonexistent/site.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_parse_error_has_line() {
        let file = write("sections: [home\nheader_offset: 80\n");
        let err = ConfigLoader::with_defaults().load_site(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_failure_lists_issues() {
        let file = write("sections: [home, home]\n");
        let err = ConfigLoader::with_defaults().load_site(file.path()).unwrap_err();
        match err {
            ConfigError::ValidationError { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "sections[1]");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_size_limit() {
        let file = write("sections: [home, events, timeline, contact]\n");
        let loader = ConfigLoader::new(ConfigLimits { max_config_size: 8 });
        let err = loader.load_site(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { limit: 8, .. }));
    }

    #[test]
    fn test_trace_with_bad_tick_fails_on_load() {
        let file = write("ticks:\n  - { at: later, offset: 10 }\n");
        let err = ConfigLoader::with_defaults().load_trace(file.path()).unwrap_err();
        assert!(err.to_string().contains("ticks[0].at"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let file = write("\u{feff}sections: [contact]\n");
        let result = ConfigLoader::with_defaults().load_site(file.path()).unwrap();
        assert_eq!(result.config.sections, vec!["contact"]);
    }
}
