//! `skyknit.toml`: optional defaults for table location, tolerance and logging.
//!
//! Command-line flags always win over file values.

use serde::Deserialize;
use skyknit_kernel::PrecisionLevel;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "skyknit.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkyknitConfig {
    pub topology: TopologyConfig,
    pub tolerance: ToleranceConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopologyConfig {
    /// Directory holding the table files; built-in tables when unset.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    pub ease_multiplier: f64,
    pub precision: PrecisionLevel,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            ease_multiplier: 1.0,
            precision: PrecisionLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

impl SkyknitConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `explicit`, or `./skyknit.toml` when no path was given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(err) if explicit.is_none() && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<SkyknitConfig, ConfigError> {
        SkyknitConfig::parse(text, Path::new("skyknit.toml"))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, SkyknitConfig::default());
        assert_eq!(config.tolerance.ease_multiplier, 1.0);
        assert_eq!(config.tolerance.precision, PrecisionLevel::Medium);
        assert!(config.topology.data_dir.is_none());
    }

    #[test]
    fn full_file_parses() {
        let config = parse(
            r#"
[topology]
data_dir = "tables"

[tolerance]
ease_multiplier = 1.5
precision = "high"

[log]
filter = "skyknit_checker=debug"
"#,
        )
        .unwrap();
        assert_eq!(config.topology.data_dir, Some(PathBuf::from("tables")));
        assert_eq!(config.tolerance.ease_multiplier, 1.5);
        assert_eq!(config.tolerance.precision, PrecisionLevel::High);
        assert_eq!(config.log.filter.as_deref(), Some("skyknit_checker=debug"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = parse("[tolerance]\nprecision = \"low\"\n").unwrap();
        assert_eq!(config.tolerance.ease_multiplier, 1.0);
        assert_eq!(config.tolerance.precision, PrecisionLevel::Low);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse("[tolerance]\nease = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(parse("[output]\ncolor = true\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = SkyknitConfig::load(Some(Path::new("/nonexistent/skyknit.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
