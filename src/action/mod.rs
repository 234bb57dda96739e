// src/action/mod.rs

//! Actions: the side effects executed for matched files.
//!
//! The dispatcher only depends on the [`Action`] trait; everything else in
//! this module is a shipped implementation:
//!
//! - [`EchoAction`] prints the match to stdout, useful for debugging a
//!   trigger setup.
//! - [`CommandAction`] spawns a process with the file's lines as arguments,
//!   using `tokio::process::Command`.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

pub mod command;

pub use command::CommandAction;

/// The contract between the dispatcher and an action.
///
/// `lines` is the matched file's contents split on newlines, with a single
/// trailing newline stripped. Implementations are free to fail; the
/// dispatcher logs failures and moves on, it never retries.
pub trait Action: Send + Sync {
    fn invoke<'a>(
        &'a self,
        matched_name: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// A sample action that writes the match to stdout.
pub struct EchoAction {
    label: String,
}

impl EchoAction {
    /// `label` is an optional tag printed with the output, to associate the
    /// output with a particular trigger.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Action for EchoAction {
    fn invoke<'a>(
        &'a self,
        matched_name: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            println!("EchoAction {} called.", self.label);
            println!("Name={matched_name}");
            println!("Data={lines:?}");
            println!();
            Ok(())
        })
    }
}
