//! Configuration management for Pepper Mining.
//!
//! Configuration is loaded with the `config` crate from a TOML file or string,
//! overlaid by environment variables prefixed with `PEPPER` (for example
//! `PEPPER__ANALYSIS__ROOT_CAUSE_TOP=10`).
//!
//! # Example
//!
//! ```ignore
//! use pepper_mining::config::load_config;
//!
//! let config = load_config("config/pepper.toml")?;
//! let data = ProcessData::with_config(config);
//! ```

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MiningError, Result};

const ENV_PREFIX: &str = "PEPPER";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Settings used when parsing raw tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// `strftime` format of the `event_time` column. Common formats are
    /// tried in turn when unset.
    #[serde(default)]
    pub time_format: Option<String>,
}

/// Settings for the analysis conveniences on the root view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Values kept per column by root cause analysis.
    #[serde(default = "default_root_cause_top")]
    pub root_cause_top: usize,

    /// KPIs reported by the overview summary.
    #[serde(default = "default_summary_kpis")]
    pub summary_kpis: Vec<String>,
}

fn default_root_cause_top() -> usize {
    5
}

fn default_summary_kpis() -> Vec<String> {
    vec!["NumberOfEvents".to_string()]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            root_cause_top: default_root_cause_top(),
            summary_kpis: default_summary_kpis(),
        }
    }
}

impl MiningConfig {
    /// Load configuration from a file, overlaid by the environment.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the event time format.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.ingest.time_format = Some(format.into());
        self
    }

    /// Set the number of values kept by root cause analysis.
    pub fn with_root_cause_top(mut self, top: usize) -> Self {
        self.analysis.root_cause_top = top;
        self
    }

    /// Set the KPIs reported by the overview summary.
    pub fn with_summary_kpis<I, S>(mut self, kpis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analysis.summary_kpis = kpis.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration values.
    ///
    /// KPI names are resolved against a registry only when used.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.root_cause_top == 0 {
            return Err(MiningError::config(
                "analysis.root_cause_top must be at least 1",
            ));
        }
        if self.analysis.summary_kpis.iter().any(|k| k.trim().is_empty()) {
            return Err(MiningError::config(
                "analysis.summary_kpis contains an empty KPI name",
            ));
        }
        if matches!(&self.ingest.time_format, Some(f) if f.trim().is_empty()) {
            return Err(MiningError::config("ingest.time_format is empty"));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MiningConfig> {
    MiningConfig::load(path)
}

/// Load configuration from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<MiningConfig> {
    let config: MiningConfig = Config::builder()
        .add_source(File::from_str(content, FileFormat::Toml))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that read or write `PEPPER__*` variables.
    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_default_config() {
        let config = MiningConfig::default();
        assert_eq!(config.ingest.time_format, None);
        assert_eq!(config.analysis.root_cause_top, 5);
        assert_eq!(config.analysis.summary_kpis, vec!["NumberOfEvents"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_str() {
        let _env = env_lock();
        let toml = r#"
            [ingest]
            time_format = "%d/%m/%Y %H:%M"

            [analysis]
            root_cause_top = 3
            summary_kpis = ["NumberOfCases", "ThroughputTime"]
        "#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.ingest.time_format.as_deref(), Some("%d/%m/%Y %H:%M"));
        assert_eq!(config.analysis.root_cause_top, 3);
        assert_eq!(
            config.analysis.summary_kpis,
            vec!["NumberOfCases", "ThroughputTime"]
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let _env = env_lock();
        let config = load_config_from_str("[analysis]\nroot_cause_top = 8\n").unwrap();
        assert_eq!(config.analysis.root_cause_top, 8);
        assert_eq!(config.analysis.summary_kpis, vec!["NumberOfEvents"]);
        assert_eq!(config.ingest, IngestConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let _env = env_lock();
        let err = load_config_from_str("[analysis]\nroot_cause_top = 0\n").unwrap_err();
        assert!(matches!(err, MiningError::Config(_)));

        let err = load_config_from_str("[analysis]\nroot_cause_top = \"many\"\n").unwrap_err();
        assert!(matches!(err, MiningError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[ingest]\ntime_format = \"%Y-%m-%d\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.ingest.time_format.as_deref(), Some("%Y-%m-%d"));
    }

    #[test]
    fn test_builder_methods() {
        let config = MiningConfig::default()
            .with_time_format("%Y")
            .with_root_cause_top(2)
            .with_summary_kpis(["Rework"]);
        assert_eq!(config.ingest.time_format.as_deref(), Some("%Y"));
        assert_eq!(config.analysis.root_cause_top, 2);
        assert_eq!(config.analysis.summary_kpis, vec!["Rework"]);
    }

    #[test]
    fn test_env_overlay() {
        let _env = env_lock();
        let var = "PEPPER__ANALYSIS__ROOT_CAUSE_TOP";
        std::env::set_var(var, "9");
        let overlaid = load_config_from_str("[analysis]\nroot_cause_top = 3\n");
        std::env::remove_var(var);

        assert_eq!(overlaid.unwrap().analysis.root_cause_top, 9);
        let plain = load_config_from_str("[analysis]\nroot_cause_top = 3\n").unwrap();
        assert_eq!(plain.analysis.root_cause_top, 3);
    }
}
