//! External command backend
//!
//! Runs a one-shot CLI (by default `codex exec <prompt>`) with the prompt as
//! its final argument. The child is killed when the call future is dropped,
//! so a timeout or a disconnected caller does not leave it running.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AssistFailure, Error, Result};

use super::AssistBackend;

pub const DEFAULT_COMMAND: &str = "codex";

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }
}

#[async_trait]
impl AssistBackend for CommandBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(program = %self.program, "Running classifier command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::AssistUnavailable(AssistFailure::Invocation(format!(
                    "failed to start {}: {}",
                    self.program, e
                )))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(Error::AssistUnavailable(AssistFailure::Invocation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                format!("{}{}", stdout, stderr).trim()
            ))));
        }

        // Some CLIs print the final answer on stderr
        if stdout.trim().is_empty() {
            Ok(stderr.into_owned())
        } else {
            Ok(stdout.into_owned())
        }
    }

    async fn health_check(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
