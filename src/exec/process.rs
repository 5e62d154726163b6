// src/exec/process.rs

//! Production process backend on top of `tokio::process`.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::errors::ProcessError;

use super::backend::{ExitStatus, ProcessBackend, ProcessHandle};

/// Runs commands through the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ProcessBackend for ShellBackend {
    fn spawn(&self, command: &str) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|err| ProcessError::io(format!("spawning process for '{command}'"), err))?;

        // Always consume both pipes so buffers don't fill; log at debug.
        if let Some(stdout) = child.stdout.take() {
            spawn_pipe_logger("stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_pipe_logger("stderr", stderr);
        }

        Ok(Box::new(ShellChild { child }))
    }
}

fn spawn_pipe_logger(stream: &'static str, pipe: impl AsyncRead + Unpin + Send + 'static) {
    tokio::spawn(async move {
        let reader = BufReader::new(pipe);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            debug!("{stream}: {line}");
        }
    });
}

/// Handle for one spawned shell process.
pub struct ShellChild {
    child: Child,
}

impl ProcessHandle for ShellChild {
    fn wait(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Result<ExitStatus, ProcessError>> + Send + '_>> {
        Box::pin(async move {
            let status = self
                .child
                .wait()
                .await
                .map_err(|err| ProcessError::io("waiting for process", err))?;

            Ok(match status.code() {
                Some(code) => ExitStatus::Code(code),
                None => ExitStatus::Signaled,
            })
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            // Already reaped: nothing left to kill.
            if matches!(self.child.try_wait(), Ok(Some(_))) {
                return;
            }

            if let Err(err) = self.child.kill().await {
                debug!(error = %err, "kill on exited process");
            }
        })
    }
}
