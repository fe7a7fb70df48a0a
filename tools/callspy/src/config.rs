use crate::errors::SpyError;
use crate::types::ThenablePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpyConfig {
    pub spy: SpyDefaults,
    pub promises: PromiseConfig,
    pub interception: InterceptionConfig,
    pub logging: LoggingConfig,
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpyDefaults {
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromiseConfig {
    pub thenable_policy: ThenablePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterceptionConfig {
    pub enforce_configurable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub max_value_bytes: usize,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            spy: SpyDefaults {
                default_name: "spy".to_string(),
            },
            promises: PromiseConfig {
                thenable_policy: ThenablePolicy::NativeOnly,
            },
            interception: InterceptionConfig {
                enforce_configurable: true,
            },
            logging: LoggingConfig {
                path: None,
                max_payload_bytes: 4096,
                budget_bytes: 50 * 1024 * 1024,
            },
            snapshot: SnapshotConfig {
                max_value_bytes: 1024,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSpyConfig {
    spy: Option<PartialSpyDefaults>,
    promises: Option<PartialPromiseConfig>,
    interception: Option<PartialInterceptionConfig>,
    logging: Option<PartialLoggingConfig>,
    snapshot: Option<PartialSnapshotConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSpyDefaults {
    default_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialPromiseConfig {
    thenable_policy: Option<ThenablePolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialInterceptionConfig {
    enforce_configurable: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSnapshotConfig {
    max_value_bytes: Option<usize>,
}

/// Reads a TOML file over the defaults. A relative `logging.path` is taken
/// relative to the file's directory.
pub fn load_config(path: &Path) -> Result<SpyConfig, SpyError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SpyError::Io(format!("{}: {e}", path.display())))?;
    let mut cfg = parse_config(&contents)?;
    if let (Some(log_path), Some(base)) = (&cfg.logging.path, path.parent()) {
        cfg.logging.path = Some(absolutize_path(base, log_path));
    }
    Ok(cfg)
}

pub fn parse_config(contents: &str) -> Result<SpyConfig, SpyError> {
    let partial: PartialSpyConfig =
        toml::from_str(contents).map_err(|e| SpyError::ConfigParse(e.to_string()))?;
    let mut cfg = SpyConfig::default();
    merge_partial_config(&mut cfg, partial);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut SpyConfig, partial: PartialSpyConfig) {
    if let Some(spy) = partial.spy {
        if let Some(default_name) = spy.default_name {
            cfg.spy.default_name = default_name;
        }
    }

    if let Some(promises) = partial.promises {
        if let Some(policy) = promises.thenable_policy {
            cfg.promises.thenable_policy = policy;
        }
    }

    if let Some(interception) = partial.interception {
        if let Some(value) = interception.enforce_configurable {
            cfg.interception.enforce_configurable = value;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(path) = logging.path {
            cfg.logging.path = Some(path);
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }

    if let Some(snapshot) = partial.snapshot {
        if let Some(value) = snapshot.max_value_bytes {
            cfg.snapshot.max_value_bytes = value;
        }
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

pub fn validate_config(cfg: &SpyConfig) -> Result<(), SpyError> {
    if cfg.spy.default_name.trim().is_empty() {
        return Err(SpyError::InvalidConfig(
            "spy.default_name must not be empty".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(SpyError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    if cfg.snapshot.max_value_bytes < 16 {
        return Err(SpyError::InvalidConfig(
            "snapshot.max_value_bytes must be at least 16".to_string(),
        ));
    }

    Ok(())
}
