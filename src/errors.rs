// src/errors.rs

//! Crate-wide error types.
//!
//! Everything here is a construction-time failure: once the dispatcher loop
//! is running, recoverable problems (unreadable files, failing actions,
//! vanished directories) are logged and absorbed, never surfaced as errors.

use thiserror::Error;

/// Reasons a trigger pattern can be rejected.
///
/// Patterns match basenames only, so a `/` is never valid, and an all-dots
/// name (`.`, `..`, ...) would shadow directory entries that are never
/// listed anyway.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("pattern must not be empty")]
    Empty,

    #[error("pattern \"{0}\" cannot be all dots")]
    AllDots(String),

    #[error("pattern \"{0}\" cannot contain a forward slash, use the basename only")]
    ContainsSlash(String),

    #[error("glob pattern \"{0}\" contains neither a '?' nor a '*'")]
    MissingWildcard(String),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

/// Configuration errors. All of these are fatal and reported to the caller
/// before the dispatcher loop starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("\"{0}\" is not a valid directory")]
    NotADirectory(String),

    #[error("poll_time must be a positive number of seconds (got {0})")]
    InvalidPollTime(f64),

    #[error("stop_check_interval must be a positive number of seconds (got {0})")]
    InvalidStopCheckInterval(f64),

    #[error("config must contain at least one [[trigger]] section")]
    NoTriggers,

    #[error(
        "trigger {index} has unknown kind \"{kind}\" \
         (expected \"exact\", \"case_insensitive\", \"glob\" or \"regex\")"
    )]
    UnknownKind { index: usize, kind: String },

    #[error("trigger {index}: {source}")]
    InvalidPattern {
        index: usize,
        #[source]
        source: PatternError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
