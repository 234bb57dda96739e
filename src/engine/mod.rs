// src/engine/mod.rs

//! The dispatch engine for dropwatch.
//!
//! This module ties together one poll cycle:
//! - list the watched directory (`scanner.rs`)
//! - offer the candidate names to each trigger, in order
//! - read matched files and invoke their actions
//! - delete consumed files
//!
//! plus the loop around it: interruptible sleeping, the cooperative stop
//! handle, and the single-cycle `--once` entry point (`dispatcher.rs`).

pub mod dispatcher;
pub mod scanner;

pub use dispatcher::{
    spawn_dispatcher, CycleSummary, Dispatcher, DispatcherOptions, LoopState, StopHandle,
    DEFAULT_POLL_TIME, DEFAULT_STOP_CHECK_INTERVAL, MIN_INTERVAL_SECS,
};
pub use scanner::scan_directory;
