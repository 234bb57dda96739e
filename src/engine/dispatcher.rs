// src/engine/dispatcher.rs

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::engine::scanner::scan_directory;
use crate::errors::ConfigError;
use crate::trigger::Trigger;

/// Default seconds between scan cycles.
pub const DEFAULT_POLL_TIME: f64 = 5.0;

/// Default seconds between stop-flag checks while sleeping.
pub const DEFAULT_STOP_CHECK_INTERVAL: f64 = 0.25;

/// Smallest accepted poll / stop-check interval, in seconds.
pub const MIN_INTERVAL_SECS: f64 = 0.0001;

/// Options for a [`Dispatcher`], mirroring the configuration surface.
///
/// `root_dir` is taken as a raw string: a trailing `/` is stripped and an
/// empty string means the current directory, both resolved at construction.
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    pub root_dir: String,
    pub can_match_multiple: bool,
    pub poll_time: f64,
    pub stop_check_interval: f64,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            root_dir: ".".to_string(),
            can_match_multiple: false,
            poll_time: DEFAULT_POLL_TIME,
            stop_check_interval: DEFAULT_STOP_CHECK_INTERVAL,
        }
    }
}

/// Where the dispatcher loop currently is in its lifecycle.
///
/// `StoppingRequested` is set from outside through a [`StopHandle`];
/// `Stopped` is terminal. The flag is observed only at sleep-interval
/// granularity, never mid-scan, so a cycle always runs to completion once
/// started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    StoppingRequested,
    Stopped,
}

const STATE_RUNNING: u8 = 0;
const STATE_STOPPING_REQUESTED: u8 = 1;
const STATE_STOPPED: u8 = 2;

impl LoopState {
    fn from_u8(v: u8) -> LoopState {
        match v {
            STATE_RUNNING => LoopState::Running,
            STATE_STOPPING_REQUESTED => LoopState::StoppingRequested,
            _ => LoopState::Stopped,
        }
    }
}

/// Cloneable handle used to request a cooperative stop and observe the loop
/// state from outside the dispatcher's own task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    state: Arc<AtomicU8>,
}

impl StopHandle {
    fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(STATE_RUNNING)),
        }
    }

    /// Ask the dispatcher to stop. The loop finishes its current cycle and
    /// exits at its next sleep checkpoint. Has no effect once stopped.
    pub fn request_stop(&self) {
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_STOPPING_REQUESTED,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
    }

    pub fn state(&self) -> LoopState {
        // Relaxed is enough: the only consumer is the sleep-interval check.
        LoopState::from_u8(self.state.load(Ordering::Relaxed))
    }

    pub fn is_stop_requested(&self) -> bool {
        !matches!(self.state(), LoopState::Running)
    }

    fn mark_stopped(&self) {
        self.state.store(STATE_STOPPED, Ordering::Relaxed);
    }
}

/// Counts for one scan-dispatch cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Regular files present at the start of the cycle.
    pub candidates: usize,
    /// Matched (trigger, name) pairs. In multi-match mode one file can
    /// count more than once.
    pub matched: usize,
    /// Dispatch attempts (files that were matched and readable).
    pub dispatched: usize,
    pub dispatch_failures: usize,
    pub deleted: usize,
    pub delete_failures: usize,
}

/// The scan-match-dispatch-cleanup loop.
///
/// One dispatcher owns one directory and an ordered trigger list. Each
/// cycle it lists the directory, offers the candidate names to every
/// trigger in declaration order, feeds each matched file's lines to the
/// trigger's action, deletes consumed files, then sleeps.
///
/// Exclusivity between triggers is governed by `can_match_multiple`:
///
/// - Single-match (default): a working copy of the candidate set shrinks as
///   triggers claim names, so the first declared trigger wins and each file
///   is deleted right after its dispatch attempt.
/// - Multi-match: every trigger sees the full candidate set; matched names
///   accumulate in a consumed set and are deleted once, after all triggers
///   have run, so a later trigger can still read the same file.
///
/// The loop is strictly sequential: no parallel trigger evaluation or
/// action invocation within a cycle, which keeps the delete-after-dispatch
/// accounting race-free without locking.
pub struct Dispatcher {
    root_dir: PathBuf,
    triggers: Vec<Trigger>,
    can_match_multiple: bool,
    poll_time: Duration,
    stop_check_interval: Duration,
    stop: StopHandle,
}

impl Dispatcher {
    /// Validate options and build a dispatcher.
    ///
    /// Fails if the root directory does not exist (after normalisation) or
    /// either interval is below [`MIN_INTERVAL_SECS`]. A poll time shorter
    /// than the stop-check interval is raised to match it, with a warning.
    pub fn new(triggers: Vec<Trigger>, options: DispatcherOptions) -> Result<Self, ConfigError> {
        let mut root = options.root_dir;
        if root.ends_with('/') {
            root.pop();
        }
        if root.is_empty() {
            root.push('.');
        }

        let root_dir = PathBuf::from(root);
        if !root_dir.is_dir() {
            return Err(ConfigError::NotADirectory(
                root_dir.to_string_lossy().into_owned(),
            ));
        }

        if options.stop_check_interval < MIN_INTERVAL_SECS {
            return Err(ConfigError::InvalidStopCheckInterval(
                options.stop_check_interval,
            ));
        }
        if options.poll_time < MIN_INTERVAL_SECS {
            return Err(ConfigError::InvalidPollTime(options.poll_time));
        }

        let mut poll_time = options.poll_time;
        if poll_time < options.stop_check_interval {
            warn!(
                poll_time,
                stop_check_interval = options.stop_check_interval,
                "poll_time is shorter than stop_check_interval, rounding it up to match"
            );
            poll_time = options.stop_check_interval;
        }

        Ok(Self {
            root_dir,
            triggers,
            can_match_multiple: options.can_match_multiple,
            poll_time: Duration::from_secs_f64(poll_time),
            stop_check_interval: Duration::from_secs_f64(options.stop_check_interval),
            stop: StopHandle::new(),
        })
    }

    /// Handle for requesting a stop and observing the loop state.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Effective poll interval, after rounding up against the stop-check
    /// interval.
    pub fn poll_time(&self) -> Duration {
        self.poll_time
    }

    pub fn stop_check_interval(&self) -> Duration {
        self.stop_check_interval
    }

    /// Run the loop until a stop is requested.
    ///
    /// Never returns an error: every steady-state failure is logged and
    /// absorbed. A directory listing failure in particular only shortens
    /// the sleep to a fifth of the poll interval and retries.
    pub async fn run(self) {
        info!(
            root = %self.root_dir.display(),
            triggers = self.triggers.len(),
            can_match_multiple = self.can_match_multiple,
            "dispatcher started"
        );

        loop {
            if self.stop.is_stop_requested() {
                break;
            }

            let paths = match scan_directory(&self.root_dir) {
                Ok(paths) => paths,
                Err(err) => {
                    error!(
                        root = %self.root_dir.display(),
                        error = %err,
                        "failed to list watched directory, retrying shortly"
                    );
                    self.sleep_checked(self.poll_time / 5).await;
                    continue;
                }
            };

            let summary = self.run_cycle(&paths).await;
            if summary.matched > 0 {
                debug!(?summary, "cycle complete");
            }

            self.sleep_checked(self.poll_time).await;
        }

        self.stop.mark_stopped();
        info!("dispatcher stopped");
    }

    /// Run exactly one scan-dispatch cycle, with no sleep afterwards.
    ///
    /// Unlike [`run`](Self::run), a listing failure is surfaced as an error
    /// here, since there is no next cycle to retry in. Backs the CLI
    /// `--once` mode and the integration tests.
    pub async fn run_once(&self) -> Result<CycleSummary> {
        let paths = scan_directory(&self.root_dir)?;
        Ok(self.run_cycle(&paths).await)
    }

    async fn run_cycle(&self, paths: &HashMap<String, PathBuf>) -> CycleSummary {
        let candidates: HashSet<String> = paths.keys().cloned().collect();

        let mut summary = CycleSummary {
            candidates: candidates.len(),
            ..CycleSummary::default()
        };

        // Working copy for single-match mode: names claimed by an earlier
        // trigger are removed so later triggers cannot re-claim them.
        let mut remaining = candidates.clone();
        // Multi-match mode instead accumulates every matched name here and
        // deletes them once, after all triggers have run.
        let mut consumed_this_cycle: HashSet<String> = HashSet::new();

        for trigger in &self.triggers {
            let matched = if self.can_match_multiple {
                trigger.find_matches(&candidates)
            } else {
                trigger.find_matches(&remaining)
            };

            if self.can_match_multiple {
                consumed_this_cycle.extend(matched.iter().cloned());
            } else {
                for name in &matched {
                    remaining.remove(name);
                }
            }

            if matched.is_empty() {
                continue;
            }
            summary.matched += matched.len();
            debug!(
                pattern = %trigger.pattern_label(),
                matched = matched.len(),
                "trigger matched files"
            );

            // Read phase. A name that cannot be read is skipped this cycle;
            // in single-match mode it is not deleted either, so it is
            // naturally retried on the next scan.
            let mut names_and_lines: Vec<(String, Vec<String>)> = Vec::new();
            for name in matched {
                let path = match paths.get(&name) {
                    Some(path) => path,
                    None => continue,
                };
                match fs::read_to_string(path) {
                    Ok(contents) => names_and_lines.push((name, parse_lines(&contents))),
                    Err(err) => {
                        warn!(
                            file = %path.display(),
                            error = %err,
                            "failed to read matched file, skipping until next cycle"
                        );
                    }
                }
            }

            for (name, lines) in &names_and_lines {
                summary.dispatched += 1;
                if let Err(err) = trigger.dispatch(name, lines).await {
                    summary.dispatch_failures += 1;
                    error!(
                        pattern = %trigger.pattern_label(),
                        file = %name,
                        error = %err,
                        "action failed, removing file anyway"
                    );
                }

                // Single-match mode deletes right after the dispatch
                // attempt, success or not. Multi-match mode defers deletion
                // because a later trigger may still need the same file.
                if !self.can_match_multiple {
                    if let Some(path) = paths.get(name) {
                        self.delete_file(name, path, &mut summary);
                    }
                }
            }
        }

        if self.can_match_multiple {
            for name in &consumed_this_cycle {
                if let Some(path) = paths.get(name) {
                    self.delete_file(name, path, &mut summary);
                }
            }
        }

        summary
    }

    fn delete_file(&self, name: &str, path: &Path, summary: &mut CycleSummary) {
        match fs::remove_file(path) {
            Ok(()) => {
                summary.deleted += 1;
                debug!(file = %name, "removed consumed file");
            }
            Err(err) => {
                summary.delete_failures += 1;
                error!(
                    file = %path.display(),
                    error = %err,
                    "unable to remove consumed file"
                );
            }
        }
    }

    /// Sleep for `total` in `stop_check_interval` increments, returning
    /// early once a stop has been requested. This bounds shutdown latency
    /// to one increment regardless of how long the poll interval is.
    async fn sleep_checked(&self, total: Duration) {
        let mut slept = Duration::ZERO;
        while slept < total {
            time::sleep(self.stop_check_interval).await;
            slept += self.stop_check_interval;
            if self.stop.is_stop_requested() {
                break;
            }
        }
    }
}

/// Run a dispatcher on its own tokio task.
///
/// The loop gets its own fault domain: a panic inside it surfaces through
/// the returned join handle without taking down the caller.
pub fn spawn_dispatcher(dispatcher: Dispatcher) -> (StopHandle, JoinHandle<()>) {
    let stop = dispatcher.stop_handle();
    let handle = tokio::spawn(dispatcher.run());
    (stop, handle)
}

/// Split file contents into the line list handed to actions.
///
/// One trailing empty entry from a final newline is dropped; blank interior
/// lines are preserved; a whitespace-only file yields no lines at all.
fn parse_lines(contents: &str) -> Vec<String> {
    if contents.trim().is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<String> = contents.split('\n').map(str::to_string).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
