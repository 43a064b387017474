//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILTRIAGE_CONFIG` (environment variable)
//! 2. `~/.config/mailtriage/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailtriage\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::triage::pipeline::{TriageOptions, DEFAULT_PARALLEL_THRESHOLD};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Pipeline tuning.
    pub triage: TriageConfig,
    /// Mailbox ingestion limits.
    pub ingest: IngestConfig,
    /// Export defaults.
    pub export: ExportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// `strftime` format string for dates in the queue table.
    pub date_format: String,
}

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Batches at least this large are enriched in parallel.
    pub parallel_threshold: usize,
}

/// Mailbox ingestion limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Read only the last N messages of a mailbox (unset = all).
    pub max_messages: Option<usize>,
    /// Messages larger than this many bytes are truncated (default: 32 MB).
    pub max_message_size: usize,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default export format: "csv", "json", "txt".
    pub default_format: String,
    /// CSV field separator character.
    pub csv_separator: char,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_messages: None,
            max_message_size: 32 * 1024 * 1024, // 32 MB
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "csv".to_string(),
            csv_separator: ',',
        }
    }
}

impl Config {
    /// Pipeline options derived from the `[triage]` section.
    pub fn triage_options(&self) -> TriageOptions {
        TriageOptions {
            parallel_threshold: self.triage.parallel_threshold.max(1),
            ..TriageOptions::default()
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    let Some(path) = config_file_path() else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILTRIAGE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mailtriage").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailtriage")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mailtriage.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.triage.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(cfg.ingest.max_messages, None);
        assert_eq!(cfg.export.csv_separator, ',');
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.ingest.max_messages = Some(100);
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.ingest.max_messages, Some(100));
        assert_eq!(parsed.general.date_format, cfg.general.date_format);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[triage]
parallel_threshold = 8

[export]
csv_separator = ";"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.triage.parallel_threshold, 8);
        assert_eq!(cfg.export.csv_separator, ';');
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.export.default_format, "csv");
    }

    #[test]
    fn test_triage_options_clamp_threshold() {
        let mut cfg = Config::default();
        cfg.triage.parallel_threshold = 0;
        let options = cfg.triage_options();
        assert_eq!(options.parallel_threshold, 1);
        assert!(options.support_only);
    }

    #[test]
    fn test_log_file_in_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/mt"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/tmp/mt/mailtriage.log"));
    }
}
