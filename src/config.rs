//! Process configuration from `LIANDRYS_*` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::formula::{SynonymEntry, SynonymTable};

pub const LOG_VAR: &str = "LIANDRYS_LOG";
pub const SYNONYMS_VAR: &str = "LIANDRYS_SYNONYMS";
pub const WORKERS_VAR: &str = "LIANDRYS_WORKERS";
pub const DISTANCE_VAR: &str = "LIANDRYS_DISTANCE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidVar {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("failed to read synonym overlay {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse synonym overlay {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Shape of a synonym overlay file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymFile {
    #[serde(default)]
    pub synonyms: Vec<SynonymEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Filter directive for the tracing subscriber.
    pub log: String,
    pub synonyms: Option<PathBuf>,
    /// Rayon workers for batch extraction; 0 uses every core.
    pub workers: usize,
    /// Default champion distance in game units.
    pub distance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log: "info".to_string(),
            synonyms: None,
            workers: 0,
            distance: 0.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from any variable source; unset or blank variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        let mut config = Self::default();
        if let Some(log) = get(LOG_VAR) {
            config.log = log;
        }
        config.synonyms = get(SYNONYMS_VAR).map(PathBuf::from);
        if let Some(raw) = get(WORKERS_VAR) {
            config.workers = raw.parse().map_err(|_| ConfigError::InvalidVar {
                var: WORKERS_VAR,
                expected: "a worker count",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = get(DISTANCE_VAR) {
            config.distance = raw
                .parse::<f64>()
                .ok()
                .filter(|distance| distance.is_finite() && *distance >= 0.0)
                .ok_or_else(|| ConfigError::InvalidVar {
                    var: DISTANCE_VAR,
                    expected: "a non-negative distance",
                    value: raw.clone(),
                })?;
        }
        Ok(config)
    }

    /// Built-in synonyms plus the overlay file, if one is configured.
    pub fn synonym_table(&self) -> Result<SynonymTable, ConfigError> {
        let mut table = SynonymTable::builtin();
        if let Some(path) = &self.synonyms {
            table.extend(load_synonym_file(path)?.synonyms);
        }
        Ok(table)
    }

    /// Install the stderr subscriber. A second call is a no-op.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_new(&self.log).unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

pub fn load_synonym_file(path: impl AsRef<Path>) -> Result<SynonymFile, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Stat;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            (LOG_VAR, "liandrys=debug"),
            (SYNONYMS_VAR, "syn.yaml"),
            (WORKERS_VAR, "4"),
            (DISTANCE_VAR, "550"),
        ]))
        .unwrap();
        assert_eq!(config.log, "liandrys=debug");
        assert_eq!(config.synonyms, Some(PathBuf::from("syn.yaml")));
        assert_eq!(config.workers, 4);
        assert_eq!(config.distance, 550.0);
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup(&[(WORKERS_VAR, "many")])).unwrap_err();
        assert!(err.to_string().contains(WORKERS_VAR));
        assert!(Config::from_lookup(lookup(&[(DISTANCE_VAR, "-5")])).is_err());
    }

    #[test]
    fn overlay_file_extends_builtin_table() {
        let path = env::temp_dir().join(format!("liandrys_synonyms_{}.yaml", std::process::id()));
        fs::write(&path, "synonyms:\n  - phrase: spell power\n    stat: ap\n").unwrap();
        let config = Config {
            synonyms: Some(path.clone()),
            ..Config::default()
        };
        let table = config.synonym_table().unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(table.lookup("spell power").map(|r| r.stat), Some(Stat::Ap));
        assert_eq!(table.len(), SynonymTable::builtin().len() + 1);
    }
}
