use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use dropwatch::config::{build_triggers, dispatcher_options, load_and_validate};
use dropwatch::engine::{Dispatcher, DispatcherOptions};
use dropwatch::errors::{ConfigError, PatternError};
use dropwatch::trigger::PatternKind;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Dropwatch.toml");
    fs::write(&path, contents).expect("write config fixture");
    path
}

#[test]
fn full_config_round_trips() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
root_dir = "inbox"
can_match_multiple = true
poll_time = 1.5
stop_check_interval = 0.1

[[trigger]]
kind = "glob"
pattern = "*.job"

[trigger.action]
type = "command"
program = "handle-job"
args = ["--queue", "default"]

[[trigger]]
kind = "exact"
pattern = "stop"

[trigger.action]
type = "echo"
label = "control"
"#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.root_dir, "inbox");
    assert!(cfg.can_match_multiple);
    assert_eq!(cfg.poll_time, 1.5);
    assert_eq!(cfg.stop_check_interval, 0.1);

    let triggers = build_triggers(&cfg)?;
    assert_eq!(triggers.len(), 2);
    assert_eq!(triggers[0].kind(), PatternKind::Glob);
    assert_eq!(triggers[0].pattern_label(), "*.job");
    assert_eq!(triggers[1].kind(), PatternKind::Exact);
    assert_eq!(triggers[1].pattern_label(), "stop");

    let options = dispatcher_options(&cfg);
    assert_eq!(options.root_dir, "inbox");
    assert!(options.can_match_multiple);
    assert_eq!(options.poll_time, 1.5);
    assert_eq!(options.stop_check_interval, 0.1);

    Ok(())
}

#[test]
fn defaults_apply_when_options_are_omitted() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[[trigger]]
kind = "regex"
pattern = "^task-"

[trigger.action]
type = "echo"
"#,
    );

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.root_dir, ".");
    assert!(!cfg.can_match_multiple);
    assert_eq!(cfg.poll_time, 5.0);
    assert_eq!(cfg.stop_check_interval, 0.25);
    assert_eq!(cfg.triggers.len(), 1);

    Ok(())
}

#[test]
fn missing_triggers_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(dir.path(), "root_dir = \".\"\n");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NoTriggers));

    Ok(())
}

#[test]
fn unknown_trigger_kind_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[[trigger]]
kind = "prefix"
pattern = "task-"

[trigger.action]
type = "echo"
"#,
    );

    let err = load_and_validate(&path).unwrap_err();
    match err {
        ConfigError::UnknownKind { index: 0, ref kind } => assert_eq!(kind, "prefix"),
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[test]
fn glob_without_wildcard_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(
        dir.path(),
        r#"
[[trigger]]
kind = "glob"
pattern = "exact-name.txt"

[trigger.action]
type = "echo"
"#,
    );

    let err = load_and_validate(&path).unwrap_err();
    match err {
        ConfigError::InvalidPattern {
            index: 0,
            source: PatternError::MissingWildcard(_),
        } => {}
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[test]
fn non_positive_intervals_are_errors() -> TestResult {
    let dir = tempfile::tempdir()?;

    let path = write_config(
        dir.path(),
        r#"
poll_time = 0.0

[[trigger]]
kind = "glob"
pattern = "*.job"

[trigger.action]
type = "echo"
"#,
    );
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPollTime(_)));

    let path = write_config(
        dir.path(),
        r#"
stop_check_interval = -1.0

[[trigger]]
kind = "glob"
pattern = "*.job"

[trigger.action]
type = "echo"
"#,
    );
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidStopCheckInterval(_)));

    Ok(())
}

#[test]
fn invalid_toml_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = write_config(dir.path(), "this is not [ toml");

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));

    Ok(())
}

#[test]
fn dispatcher_rejects_a_missing_root_dir() {
    let options = DispatcherOptions {
        root_dir: "/definitely/not/here".to_string(),
        ..DispatcherOptions::default()
    };

    let err = Dispatcher::new(Vec::new(), options).unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory(_)));
}

#[test]
fn dispatcher_normalises_the_root_dir() -> TestResult {
    let dir = tempfile::tempdir()?;

    // A trailing separator is stripped.
    let options = DispatcherOptions {
        root_dir: format!("{}/", dir.path().display()),
        ..DispatcherOptions::default()
    };
    let d = Dispatcher::new(Vec::new(), options)?;
    assert_eq!(d.root_dir(), dir.path());

    // An empty string means the current directory.
    let options = DispatcherOptions {
        root_dir: String::new(),
        ..DispatcherOptions::default()
    };
    let d = Dispatcher::new(Vec::new(), options)?;
    assert_eq!(d.root_dir(), Path::new("."));

    Ok(())
}
