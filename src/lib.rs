// src/lib.rs

pub mod action;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod trigger;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{ActionConfig, ConfigFile};
use crate::config::{build_triggers, dispatcher_options};
use crate::engine::{spawn_dispatcher, Dispatcher};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - trigger construction
/// - the dispatcher loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let triggers = build_triggers(&cfg)?;
    let options = dispatcher_options(&cfg);
    let dispatcher = Dispatcher::new(triggers, options)?;

    if args.once {
        let summary = dispatcher.run_once().await?;
        info!(?summary, "single cycle complete");
        return Ok(());
    }

    let (stop, handle) = spawn_dispatcher(dispatcher);

    // Ctrl-C → cooperative stop; the loop finishes its current cycle and
    // exits at its next sleep checkpoint.
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received, requesting dispatcher stop");
            stop.request_stop();
        });
    }

    handle.await?;
    Ok(())
}

/// Simple dry-run output: print options and triggers.
fn print_dry_run(cfg: &ConfigFile) {
    println!("dropwatch dry-run");
    println!("  root_dir = {}", cfg.root_dir);
    println!("  can_match_multiple = {}", cfg.can_match_multiple);
    println!("  poll_time = {}", cfg.poll_time);
    println!("  stop_check_interval = {}", cfg.stop_check_interval);
    println!();

    println!("triggers ({}):", cfg.triggers.len());
    for trigger in &cfg.triggers {
        println!("  - {} \"{}\"", trigger.kind, trigger.pattern);
        match &trigger.action {
            ActionConfig::Echo { label } => {
                println!("      action: echo (label: {label:?})");
            }
            ActionConfig::Command { program, args } => {
                println!("      action: command {program}");
                if !args.is_empty() {
                    println!("      args: {args:?}");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
