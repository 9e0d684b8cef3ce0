use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const LOG_FILTER_ENV: &str = "POSET_LOG";
pub const LOG_FORMAT_ENV: &str = "POSET_LOG_FORMAT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Anything other than `json` falls back to compact output.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Re-check every poset invariant after each successful mutation.
    #[serde(default)]
    pub verify_invariants: bool,
}

fn default_log_filter() -> String {
    "poset_store=info,warn".to_string()
}

impl Config {
    /// Reads a TOML config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str::<Self>(content)?)
    }

    /// Applies `POSET_LOG` and `POSET_LOG_FORMAT` when set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(filter) = env::var(LOG_FILTER_ENV) {
            self.log.filter = filter;
        }
        if let Ok(format) = env::var(LOG_FORMAT_ENV) {
            self.log.format = LogFormat::parse(&format);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.log.filter, "poset_store=info,warn");
        assert!(!cfg.registry.verify_invariants);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poset.toml");
        fs::write(&path, "[registry]\nverify_invariants = true\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert!(cfg.registry.verify_invariants);
        assert_eq!(cfg.log, LogConfig::default());
    }

    #[test]
    fn format_is_parsed() {
        let cfg = Config::parse("[log]\nformat = \"json\"\nfilter = \"debug\"\n").unwrap();
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.filter, "debug");
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[log\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err}").contains("Failed to parse"));
    }

    #[test]
    fn env_overrides_file_values() {
        let base = Config::parse("[log]\nfilter = \"warn\"\nformat = \"compact\"\n").unwrap();

        env::set_var(LOG_FILTER_ENV, "poset_store=debug");
        env::set_var(LOG_FORMAT_ENV, "json");
        let overridden = base.clone().apply_env();
        env::remove_var(LOG_FILTER_ENV);
        env::remove_var(LOG_FORMAT_ENV);

        assert_eq!(overridden.log.filter, "poset_store=debug");
        assert_eq!(overridden.log.format, LogFormat::Json);
        assert_eq!(overridden.registry, base.registry);
        assert_eq!(base.clone().apply_env(), base);
    }

    #[test]
    fn unknown_format_falls_back_to_compact() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Compact);
    }
}
