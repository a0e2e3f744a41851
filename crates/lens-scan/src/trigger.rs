//! Fire-and-forget sinks for verdict fields (speech, sharing).
//!
//! A trigger hands off a payload and returns immediately. Nothing it does can
//! affect scan state.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub trait Trigger: Send + Sync {
    fn trigger(&self, payload: &str);
}

/// Runs an external program with the payload on stdin. The child is never
/// awaited by the caller.
///
/// Must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct CommandTrigger {
    program: String,
    args: Vec<String>,
}

impl CommandTrigger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` when blank.
    #[must_use]
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self::new(program, words.collect()))
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Trigger for CommandTrigger {
    fn trigger(&self, payload: &str) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(error) => {
                tracing::warn!(program = %self.program, %error, "trigger: spawn failed");
                return;
            }
        };

        let payload = payload.to_string();
        let program = self.program.clone();
        tokio::spawn(async move {
            if let Some(mut stdin) = child.stdin.take() {
                if let Err(error) = stdin.write_all(payload.as_bytes()).await {
                    tracing::debug!(%program, %error, "trigger: stdin write failed");
                }
                drop(stdin);
            }
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::debug!(%program, %status, "trigger: command exited non-zero");
                }
                Ok(_) => {}
                Err(error) => tracing::debug!(%program, %error, "trigger: wait failed"),
            }
        });
    }
}

/// Logs the payload at info level.
#[derive(Debug, Clone, Copy)]
pub struct TracingTrigger {
    sink: &'static str,
}

impl TracingTrigger {
    #[must_use]
    pub const fn new(sink: &'static str) -> Self {
        Self { sink }
    }
}

impl Trigger for TracingTrigger {
    fn trigger(&self, payload: &str) {
        tracing::info!(sink = self.sink, payload, "trigger");
    }
}
