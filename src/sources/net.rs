//! # Network interfaces.
//!
//! Link state comes from `/sys/class/net/<iface>/operstate`, addresses from
//! `ip -o addr show dev <iface>` (only asked for links that are up).
//! [`link_monitor`] turns `ip monitor link address` into a push trigger so
//! network blocks repaint as soon as a cable or address changes.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{SourceError, line_trigger};
use crate::command::{Command, RunnerRef};
use crate::module::Trigger;

/// Default sysfs location of network interfaces.
pub const NET_ROOT: &str = "/sys/class/net";

/// RFC 2863 operational state, as exposed in `operstate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkState {
    Up,
    Dormant,
    Testing,
    Down,
    LowerLayerDown,
    NotPresent,
    Unknown,
}

impl LinkState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "up" => LinkState::Up,
            "dormant" => LinkState::Dormant,
            "testing" => LinkState::Testing,
            "down" => LinkState::Down,
            "lowerlayerdown" => LinkState::LowerLayerDown,
            "notpresent" => LinkState::NotPresent,
            _ => LinkState::Unknown,
        }
    }

    /// Preference when several interfaces match, higher wins.
    fn rank(self) -> u8 {
        match self {
            LinkState::Up => 4,
            LinkState::Dormant => 3,
            LinkState::Testing => 2,
            LinkState::Down | LinkState::LowerLayerDown | LinkState::Unknown => 1,
            LinkState::NotPresent => 0,
        }
    }
}

/// Snapshot of one interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetInfo {
    pub name: String,
    pub state: LinkState,
    pub ips: Vec<IpAddr>,
}

impl NetInfo {
    pub fn connected(&self) -> bool {
        self.state == LinkState::Up
    }

    pub fn connecting(&self) -> bool {
        matches!(self.state, LinkState::Dormant | LinkState::Testing)
    }

    /// The interface exists, whatever its state.
    pub fn enabled(&self) -> bool {
        self.state != LinkState::NotPresent
    }
}

#[async_trait]
pub trait NetSource: Send + Sync + 'static {
    /// The best interface whose name starts with `prefix`, if any.
    async fn net(&self, prefix: &str) -> Result<Option<NetInfo>, SourceError>;
}

/// [`NetSource`] over sysfs and `ip`.
#[derive(Clone)]
pub struct SysfsNet {
    runner: RunnerRef,
    root: PathBuf,
}

impl SysfsNet {
    pub fn new(runner: RunnerRef) -> Self {
        Self::with_root(runner, NET_ROOT)
    }

    pub fn with_root(runner: RunnerRef, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }
}

#[async_trait]
impl NetSource for SysfsNet {
    async fn net(&self, prefix: &str) -> Result<Option<NetInfo>, SourceError> {
        let links = links(&self.root, |name, _| name.starts_with(prefix)).await?;
        let Some((name, state)) = best(links) else {
            return Ok(None);
        };
        let ips = if state == LinkState::Up {
            addresses(&self.runner, &name).await?
        } else {
            Vec::new()
        };
        Ok(Some(NetInfo { name, state, ips }))
    }
}

/// Lists interfaces under `root` accepted by `keep(name, dir)`, with their state.
pub(crate) async fn links<F>(root: &Path, keep: F) -> Result<Vec<(String, LinkState)>, SourceError>
where
    F: Fn(&str, &Path) -> bool,
{
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut out = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let dir = entry.path();
        if !keep(&name, &dir) {
            continue;
        }
        let state = match tokio::fs::read_to_string(dir.join("operstate")).await {
            Ok(raw) => LinkState::parse(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => LinkState::NotPresent,
            Err(err) => return Err(err.into()),
        };
        out.push((name, state));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Highest ranked link; ties go to the first name.
pub(crate) fn best(links: Vec<(String, LinkState)>) -> Option<(String, LinkState)> {
    links
        .into_iter()
        .fold(None, |acc: Option<(String, LinkState)>, cur| match acc {
            Some(a) if a.1.rank() >= cur.1.rank() => Some(a),
            _ => Some(cur),
        })
}

async fn addresses(runner: &RunnerRef, name: &str) -> Result<Vec<IpAddr>, SourceError> {
    let cmd = Command::new("ip").args(["-o", "addr", "show", "dev", name]);
    let out = runner.run(&cmd).await?;
    Ok(parse_addrs(&out.stdout))
}

/// Extracts addresses from `ip -o addr` lines, in order.
fn parse_addrs(stdout: &str) -> Vec<IpAddr> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            words.find(|w| *w == "inet" || *w == "inet6")?;
            let cidr = words.next()?;
            cidr.split('/').next()?.parse().ok()
        })
        .collect()
}

/// Trigger firing on every link or address change.
pub fn link_monitor() -> Trigger {
    line_trigger("ip", &["monitor", "link", "address"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;
    use std::fs;

    const IP_ADDR: &str = "\
2: enp3s0    inet 192.168.1.23/24 brd 192.168.1.255 scope global dynamic enp3s0\\       valid_lft 86000sec preferred_lft 86000sec
2: enp3s0    inet6 fe80::1c2:3ff:fe45:6789/64 scope link \\       valid_lft forever preferred_lft forever
";

    fn iface(root: &Path, name: &str, state: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), format!("{state}\n")).unwrap();
    }

    #[test]
    fn parses_ip_addr_lines() {
        let ips = parse_addrs(IP_ADDR);
        assert_eq!(ips.len(), 2);
        assert_eq!(ips[0].to_string(), "192.168.1.23");
        assert_eq!(ips[1].to_string(), "fe80::1c2:3ff:fe45:6789");
        assert!(parse_addrs("garbage\n").is_empty());
    }

    #[tokio::test]
    async fn picks_the_best_matching_interface() {
        let root = tempfile::tempdir().unwrap();
        iface(root.path(), "lo", "unknown");
        iface(root.path(), "eno1", "down");
        iface(root.path(), "enp3s0", "up");
        iface(root.path(), "wlan0", "up");

        let runner = FakeRunner::new();
        runner.reply("ip -o addr show dev enp3s0", Ok(IP_ADDR));
        let net = SysfsNet::with_root(runner.clone(), root.path());

        let info = net.net("e").await.unwrap().unwrap();
        assert_eq!(info.name, "enp3s0");
        assert!(info.connected());
        assert_eq!(info.ips.len(), 2);
    }

    #[tokio::test]
    async fn down_links_skip_the_address_lookup() {
        let root = tempfile::tempdir().unwrap();
        iface(root.path(), "eth0", "lowerlayerdown");
        let runner = FakeRunner::new();
        let net = SysfsNet::with_root(runner.clone(), root.path());

        let info = net.net("e").await.unwrap().unwrap();
        assert_eq!(info.state, LinkState::LowerLayerDown);
        assert!(info.enabled() && !info.connected() && !info.connecting());
        assert!(runner.calls().is_empty());

        assert_eq!(net.net("x").await.unwrap(), None);
    }
}
