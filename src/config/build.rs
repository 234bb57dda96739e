// src/config/build.rs

use std::str::FromStr;
use std::sync::Arc;

use crate::action::{Action, CommandAction, EchoAction};
use crate::config::model::{ActionConfig, ConfigFile, TriggerConfig};
use crate::engine::DispatcherOptions;
use crate::errors::ConfigError;
use crate::trigger::{PatternKind, PatternMatcher, Trigger};

/// Compile the raw `[[trigger]]` sections into the ordered trigger list the
/// dispatcher runs with. Order is preserved: it is the tie-break in
/// single-match mode.
pub fn build_triggers(cfg: &ConfigFile) -> Result<Vec<Trigger>, ConfigError> {
    let mut triggers = Vec::with_capacity(cfg.triggers.len());
    for (index, spec) in cfg.triggers.iter().enumerate() {
        triggers.push(build_trigger(index, spec)?);
    }
    Ok(triggers)
}

fn build_trigger(index: usize, spec: &TriggerConfig) -> Result<Trigger, ConfigError> {
    let kind = PatternKind::from_str(&spec.kind).map_err(|_| ConfigError::UnknownKind {
        index,
        kind: spec.kind.clone(),
    })?;

    let matcher = PatternMatcher::new(kind, &spec.pattern)
        .map_err(|source| ConfigError::InvalidPattern { index, source })?;

    Ok(Trigger::new(matcher, build_action(&spec.action)))
}

fn build_action(cfg: &ActionConfig) -> Arc<dyn Action> {
    match cfg {
        ActionConfig::Echo { label } => Arc::new(EchoAction::new(label.clone())),
        ActionConfig::Command { program, args } => {
            Arc::new(CommandAction::new(program.clone(), args.clone()))
        }
    }
}

/// Map the top-level config options onto [`DispatcherOptions`].
pub fn dispatcher_options(cfg: &ConfigFile) -> DispatcherOptions {
    DispatcherOptions {
        root_dir: cfg.root_dir.clone(),
        can_match_multiple: cfg.can_match_multiple,
        poll_time: cfg.poll_time,
        stop_check_interval: cfg.stop_check_interval,
    }
}
