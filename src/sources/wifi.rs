//! # Wireless interfaces.
//!
//! A wireless interface is one with a `wireless` directory in sysfs. The
//! SSID is asked from `iwgetid -r <iface>` while the link is up; `iwgetid`
//! exits non-zero when not associated, which reads as "no SSID".

use std::path::PathBuf;

use async_trait::async_trait;

use super::SourceError;
use super::net::{LinkState, NET_ROOT, best, links};
use crate::command::{Command, CommandError, RunnerRef};

/// Snapshot of the wireless interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WifiInfo {
    pub name: String,
    pub ssid: Option<String>,
    pub state: LinkState,
}

impl WifiInfo {
    /// Up and associated.
    pub fn connected(&self) -> bool {
        self.state == LinkState::Up && self.ssid.is_some()
    }

    /// Associating, or up without an SSID yet.
    pub fn connecting(&self) -> bool {
        matches!(self.state, LinkState::Dormant | LinkState::Testing)
            || (self.state == LinkState::Up && self.ssid.is_none())
    }

    pub fn enabled(&self) -> bool {
        self.state != LinkState::NotPresent
    }
}

#[async_trait]
pub trait WifiSource: Send + Sync + 'static {
    /// The first wireless interface, if the machine has one.
    async fn wifi(&self) -> Result<Option<WifiInfo>, SourceError>;
}

/// [`WifiSource`] over sysfs and `iwgetid`.
#[derive(Clone)]
pub struct SysfsWifi {
    runner: RunnerRef,
    root: PathBuf,
}

impl SysfsWifi {
    pub fn new(runner: RunnerRef) -> Self {
        Self::with_root(runner, NET_ROOT)
    }

    pub fn with_root(runner: RunnerRef, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    async fn ssid(&self, name: &str) -> Result<Option<String>, SourceError> {
        let cmd = Command::new("iwgetid").args(["-r", name]);
        match self.runner.run(&cmd).await {
            Ok(out) => {
                let ssid = out.stdout.trim();
                Ok((!ssid.is_empty()).then(|| ssid.to_string()))
            }
            Err(CommandError::Exit { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl WifiSource for SysfsWifi {
    async fn wifi(&self) -> Result<Option<WifiInfo>, SourceError> {
        let wireless = links(&self.root, |_, dir| dir.join("wireless").is_dir()).await?;
        let Some((name, state)) = best(wireless) else {
            return Ok(None);
        };
        let ssid = if state == LinkState::Up {
            self.ssid(&name).await?
        } else {
            None
        };
        Ok(Some(WifiInfo { name, ssid, state }))
    }
}
