//! # External commands.
//!
//! Everything the bar runs as a subprocess (`df`, `iwconfig`, `lpass`,
//! `wpa_supplicant`, ...) goes through a [`CommandRunner`], so blocks can be
//! tested against fakes and every call is bounded by a timeout.
//!
//! ## Rules
//! - Children are spawned with `kill_on_drop(true)`: dropping the future
//!   (tick timeout, shutdown) terminates the child.
//! - A non-zero exit status is an error ([`CommandError::Exit`]) carrying the
//!   captured output.
//! - `Command::timeout = None` means unbounded; [`Command::new`] sets
//!   [`DEFAULT_TIMEOUT`].

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Timeout applied by [`Command::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A program invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// `bash -c <script>`.
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("bash").arg("-c").arg(script)
    }

    /// Wraps `program args..` in `sudo`.
    pub fn sudo(program: impl Into<String>) -> Self {
        Self::new("sudo").arg(program)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable command line, for logs.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured output of a successful command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Errors from running a [`Command`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("could not spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {code:?}: {stderr}")]
    Exit {
        program: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl CommandError {
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::Spawn { .. } => "command_spawn",
            CommandError::Timeout { .. } => "command_timeout",
            CommandError::Exit { .. } => "command_exit",
        }
    }
}

/// Runs external commands.
///
/// Implementations must honor [`Command::timeout`] and must not leave
/// children running once the returned future is dropped.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    async fn run(&self, cmd: &Command) -> Result<CommandOutput, CommandError>;
}

/// Shared handle to a runner.
pub type RunnerRef = Arc<dyn CommandRunner>;

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn arc() -> RunnerRef {
        Arc::new(Self)
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, cmd: &Command) -> Result<CommandOutput, CommandError> {
        debug!(command = %cmd.display(), "running command");

        let child = tokio::process::Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;

        let output_fut = child.wait_with_output();
        let output = match cmd.timeout.filter(|d| *d > Duration::ZERO) {
            Some(timeout) => match tokio::time::timeout(timeout, output_fut).await {
                Ok(res) => res,
                Err(_elapsed) => {
                    return Err(CommandError::Timeout {
                        program: cmd.program.clone(),
                        timeout,
                    });
                }
            },
            None => output_fut.await,
        }
        .map_err(|source| CommandError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(CommandError::Exit {
                program: cmd.program.clone(),
                code: output.status.code(),
                stdout,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted runner for block tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies are matched by command line prefix; unmatched commands fail to spawn.
    #[derive(Default)]
    pub struct FakeRunner {
        replies: Mutex<Vec<(String, VecDeque<Result<String, i32>>)>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Queues a reply; the last queued reply for a prefix repeats forever.
        pub fn reply(&self, prefix: &str, reply: Result<&str, i32>) {
            let mut replies = self.replies.lock().unwrap();
            let reply = reply.map(str::to_string);
            match replies.iter_mut().find(|(p, _)| p == prefix) {
                Some((_, queue)) => queue.push_back(reply),
                None => replies.push((prefix.to_string(), VecDeque::from([reply]))),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, cmd: &Command) -> Result<CommandOutput, CommandError> {
            let line = cmd.display();
            self.calls.lock().unwrap().push(line.clone());

            let mut replies = self.replies.lock().unwrap();
            let Some((_, queue)) = replies.iter_mut().find(|(p, _)| line.starts_with(p.as_str()))
            else {
                return Err(CommandError::Spawn {
                    program: cmd.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no fake reply"),
                });
            };
            let reply = if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            };
            match reply {
                Ok(stdout) => Ok(CommandOutput {
                    stdout,
                    stderr: String::new(),
                }),
                Err(code) => Err(CommandError::Exit {
                    program: cmd.program.clone(),
                    code: Some(code),
                    stdout: String::new(),
                    stderr: "fake failure".into(),
                }),
            }
        }
    }
}
