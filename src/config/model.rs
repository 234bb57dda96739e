// src/config/model.rs

use serde::Deserialize;

use crate::engine::{DEFAULT_POLL_TIME, DEFAULT_STOP_CHECK_INTERVAL};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// root_dir = "inbox"
/// can_match_multiple = false
/// poll_time = 5.0
/// stop_check_interval = 0.25
///
/// [[trigger]]
/// kind = "glob"
/// pattern = "*.job"
///
/// [trigger.action]
/// type = "command"
/// program = "handle-job"
/// args = ["--queue", "default"]
/// ```
///
/// Trigger order in the file is evaluation order: when a file matches more
/// than one trigger in single-match mode, the first declared one wins.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Directory to watch. An empty string means the current directory.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// If true, one file can be matched and dispatched by every matching
    /// trigger in the same cycle before it is deleted. Usually, and by
    /// default, this should be false.
    #[serde(default)]
    pub can_match_multiple: bool,

    /// Seconds to rest in between polling the directory.
    #[serde(default = "default_poll_time")]
    pub poll_time: f64,

    /// Sleep increment, in seconds. The poll sleep happens in increments of
    /// this length, testing for a stop request after each one.
    #[serde(default = "default_stop_check_interval")]
    pub stop_check_interval: f64,

    /// All `[[trigger]]` sections, in declaration order.
    #[serde(default, rename = "trigger")]
    pub triggers: Vec<TriggerConfig>,
}

fn default_root_dir() -> String {
    ".".to_string()
}

fn default_poll_time() -> f64 {
    DEFAULT_POLL_TIME
}

fn default_stop_check_interval() -> f64 {
    DEFAULT_STOP_CHECK_INTERVAL
}

/// One `[[trigger]]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// `"exact"`, `"case_insensitive"`, `"glob"` or `"regex"`.
    pub kind: String,

    /// The pattern candidate file names are tested against.
    pub pattern: String,

    /// What to do with a matched file's contents.
    pub action: ActionConfig,
}

/// `[trigger.action]`, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Print the match to stdout. Useful for debugging a trigger setup.
    Echo {
        #[serde(default)]
        label: String,
    },

    /// Spawn `program` with the configured `args`, then the matched name,
    /// then the file's lines as arguments.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}
