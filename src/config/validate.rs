// src/config/validate.rs

use std::str::FromStr;

use crate::config::model::ConfigFile;
use crate::engine::MIN_INTERVAL_SECS;
use crate::errors::ConfigError;
use crate::trigger::{PatternKind, PatternMatcher};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one trigger
/// - every trigger kind is known and its pattern compiles
/// - `poll_time` and `stop_check_interval` are positive
///
/// It does **not** check that `root_dir` exists; that happens when the
/// dispatcher is constructed, so a `--dry-run` can inspect a config for a
/// directory that will only exist at deployment time.
pub fn validate_config(cfg: &ConfigFile) -> Result<(), ConfigError> {
    ensure_has_triggers(cfg)?;
    validate_intervals(cfg)?;
    validate_triggers(cfg)?;
    Ok(())
}

fn ensure_has_triggers(cfg: &ConfigFile) -> Result<(), ConfigError> {
    if cfg.triggers.is_empty() {
        return Err(ConfigError::NoTriggers);
    }
    Ok(())
}

fn validate_intervals(cfg: &ConfigFile) -> Result<(), ConfigError> {
    if cfg.poll_time < MIN_INTERVAL_SECS {
        return Err(ConfigError::InvalidPollTime(cfg.poll_time));
    }
    if cfg.stop_check_interval < MIN_INTERVAL_SECS {
        return Err(ConfigError::InvalidStopCheckInterval(cfg.stop_check_interval));
    }
    Ok(())
}

fn validate_triggers(cfg: &ConfigFile) -> Result<(), ConfigError> {
    for (index, spec) in cfg.triggers.iter().enumerate() {
        let kind =
            PatternKind::from_str(&spec.kind).map_err(|_| ConfigError::UnknownKind {
                index,
                kind: spec.kind.clone(),
            })?;

        PatternMatcher::new(kind, &spec.pattern)
            .map_err(|source| ConfigError::InvalidPattern { index, source })?;
    }
    Ok(())
}
