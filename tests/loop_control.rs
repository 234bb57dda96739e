use std::error::Error;
use std::fs;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::time::timeout;

use dropwatch::action::Action;
use dropwatch::engine::{spawn_dispatcher, Dispatcher, DispatcherOptions, LoopState};
use dropwatch::trigger::{PatternKind, PatternMatcher, Trigger};

type TestResult = Result<(), Box<dyn Error>>;
type Calls = Arc<Mutex<Vec<(String, Vec<String>)>>>;

struct RecordingAction {
    calls: Calls,
}

impl Action for RecordingAction {
    fn invoke<'a>(
        &'a self,
        matched_name: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((matched_name.to_string(), lines.to_vec()));
            Ok(())
        })
    }
}

fn recording_action() -> (Arc<dyn Action>, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let action: Arc<dyn Action> = Arc::new(RecordingAction {
        calls: Arc::clone(&calls),
    });
    (action, calls)
}

async fn wait_until(cond: impl Fn() -> bool, limit: Duration) {
    let start = Instant::now();
    while !cond() && start.elapsed() < limit {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn stop_request_during_sleep_stops_promptly() -> TestResult {
    let dir = tempfile::tempdir()?;
    let options = DispatcherOptions {
        root_dir: dir.path().to_string_lossy().into_owned(),
        can_match_multiple: false,
        poll_time: 30.0,
        stop_check_interval: 0.05,
    };
    let d = Dispatcher::new(Vec::new(), options)?;

    let (stop, handle) = spawn_dispatcher(d);
    assert_eq!(stop.state(), LoopState::Running);

    // Let the loop get into its 30-second poll sleep, then ask it to stop.
    // With a 50 ms check interval it must exit long before the poll sleep
    // would have ended on its own.
    tokio::time::sleep(Duration::from_millis(100)).await;
    stop.request_stop();

    timeout(Duration::from_secs(2), handle).await??;
    assert_eq!(stop.state(), LoopState::Stopped);

    Ok(())
}

#[test]
fn short_poll_time_is_rounded_up_to_the_check_interval() -> TestResult {
    let dir = tempfile::tempdir()?;
    let options = DispatcherOptions {
        root_dir: dir.path().to_string_lossy().into_owned(),
        can_match_multiple: false,
        poll_time: 0.01,
        stop_check_interval: 0.5,
    };
    let d = Dispatcher::new(Vec::new(), options)?;

    assert_eq!(d.poll_time(), Duration::from_secs_f64(0.5));
    assert_eq!(d.poll_time(), d.stop_check_interval());

    Ok(())
}

#[tokio::test]
async fn vanished_directory_is_retried_until_it_returns() -> TestResult {
    let outer = tempfile::tempdir()?;
    let watched = outer.path().join("inbox");
    fs::create_dir(&watched)?;

    let (action, calls) = recording_action();
    let matcher = PatternMatcher::new(PatternKind::Glob, "*.job")?;
    let options = DispatcherOptions {
        root_dir: watched.to_string_lossy().into_owned(),
        can_match_multiple: false,
        poll_time: 0.05,
        stop_check_interval: 0.01,
    };
    let d = Dispatcher::new(vec![Trigger::new(matcher, action)], options)?;

    let (stop, handle) = spawn_dispatcher(d);

    // Pull the directory out from under the loop; it should log and keep
    // retrying rather than die.
    fs::remove_dir(&watched)?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(stop.state(), LoopState::Running);

    // Recreating the directory resumes normal operation.
    fs::create_dir(&watched)?;
    fs::write(watched.join("x.job"), "payload\n")?;

    wait_until(|| !calls.lock().unwrap().is_empty(), Duration::from_secs(5)).await;
    wait_until(|| !watched.join("x.job").exists(), Duration::from_secs(5)).await;

    assert_eq!(
        calls.lock().unwrap()[0],
        ("x.job".to_string(), vec!["payload".to_string()])
    );
    assert!(!watched.join("x.job").exists());

    stop.request_stop();
    timeout(Duration::from_secs(2), handle).await??;
    assert_eq!(stop.state(), LoopState::Stopped);

    Ok(())
}

#[tokio::test]
async fn stop_handle_is_idempotent_and_observable() -> TestResult {
    let dir = tempfile::tempdir()?;
    let options = DispatcherOptions {
        root_dir: dir.path().to_string_lossy().into_owned(),
        can_match_multiple: false,
        poll_time: 10.0,
        stop_check_interval: 0.02,
    };
    let d = Dispatcher::new(Vec::new(), options)?;
    let observer = d.stop_handle();

    let (stop, handle) = spawn_dispatcher(d);

    tokio::time::sleep(Duration::from_millis(50)).await;
    stop.request_stop();
    stop.request_stop();

    timeout(Duration::from_secs(2), handle).await??;

    // Every clone of the handle observes the terminal state.
    assert_eq!(stop.state(), LoopState::Stopped);
    assert_eq!(observer.state(), LoopState::Stopped);
    assert!(observer.is_stop_requested());

    Ok(())
}
