// src/action/command.rs

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::action::Action;

/// An action that spawns a process for each matched file.
///
/// The child's argument list is: the configured static `args`, then the
/// matched file name, then the file's lines. The matched name is included
/// because a glob trigger can match many names in one cycle and the child
/// otherwise cannot tell which file fired.
pub struct CommandAction {
    program: String,
    args: Vec<String>,
}

impl CommandAction {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Action for CommandAction {
    fn invoke<'a>(
        &'a self,
        matched_name: &'a str,
        lines: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.run(matched_name, lines))
    }
}

impl CommandAction {
    async fn run(&self, matched_name: &str, lines: &[String]) -> Result<()> {
        info!(program = %self.program, file = %matched_name, "starting action process");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(matched_name)
            .args(lines)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning process '{}'", self.program))?;

        // Always consume stdout/stderr so pipe buffers don't fill; log at debug.
        if let Some(stdout) = child.stdout.take() {
            let program = self.program.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(program = %program, "stdout: {}", line);
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let program = self.program.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(program = %program, "stderr: {}", line);
                }
            });
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for process '{}'", self.program))?;

        let code = status.code().unwrap_or(-1);
        info!(
            program = %self.program,
            exit_code = code,
            success = status.success(),
            "action process exited"
        );

        if !status.success() {
            return Err(anyhow!(
                "process '{}' exited with code {}",
                self.program,
                code
            ));
        }

        Ok(())
    }
}
