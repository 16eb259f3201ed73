//! # Data-source collaborators.
//!
//! Blocks never touch the OS directly: they ask a narrow source trait for a
//! snapshot and format it. Each trait has a Linux implementation reading
//! sysfs or running a command through a [`CommandRunner`](crate::command::CommandRunner),
//! and tests plug in fakes.
//!
//! - [`battery`]: [`BatterySource`], sysfs `power_supply`, `udevadm` trigger;
//! - [`disk`]: [`DiskSource`], `df`;
//! - [`net`]: [`NetSource`], sysfs `operstate` plus `ip addr`, `ip monitor` trigger;
//! - [`wifi`]: [`WifiSource`], sysfs `wireless` plus `iwgetid`.

use std::process::Stdio;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout};
use tracing::{debug, warn};

use crate::command::CommandError;
use crate::module::Trigger;

pub mod battery;
pub mod disk;
pub mod net;
pub mod wifi;

pub use battery::{BatteryInfo, BatterySource, BatteryStatus, SysfsBattery};
pub use disk::{DfDisk, DiskInfo, DiskSource};
pub use net::{LinkState, NetInfo, NetSource, SysfsNet};
pub use wifi::{SysfsWifi, WifiInfo, WifiSource};

/// Errors reported by data sources.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SourceError {
    /// Reading sysfs (or another file) failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A file or command output did not have the expected shape.
    #[error("unexpected data: {0}")]
    Parse(String),

    /// A helper command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl SourceError {
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::Io(_) => "source_io",
            SourceError::Parse(_) => "source_parse",
            SourceError::Command(err) => err.as_label(),
        }
    }
}

struct Monitor {
    _child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

fn spawn_monitor(program: &str, args: &[&str]) -> std::io::Result<Monitor> {
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("monitor stdout not captured"))?;
    Ok(Monitor {
        _child: child,
        lines: BufReader::new(stdout).lines(),
    })
}

/// Trigger yielding once per line printed by a long-running command.
///
/// The command is spawned on first poll and killed when the stream is
/// dropped. A command that cannot be spawned or exits ends the stream.
pub(crate) fn line_trigger(program: &'static str, args: &'static [&'static str]) -> Trigger {
    stream::unfold(None::<Monitor>, move |state| async move {
        let mut monitor = match state {
            Some(monitor) => monitor,
            None => match spawn_monitor(program, args) {
                Ok(monitor) => monitor,
                Err(err) => {
                    warn!(program, error = %err, "monitor not started");
                    return None;
                }
            },
        };
        match monitor.lines.next_line().await {
            Ok(Some(_)) => Some(((), Some(monitor))),
            Ok(None) => {
                debug!(program, "monitor exited");
                None
            }
            Err(err) => {
                warn!(program, error = %err, "monitor read failed");
                None
            }
        }
    })
    .boxed()
}
