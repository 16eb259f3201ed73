//! # Battery state.
//!
//! [`SysfsBattery`] reads every `BAT*` entry under
//! `/sys/class/power_supply` and aggregates them into one [`BatteryInfo`]:
//! energies and power are summed, the status is the most relevant one
//! (discharging wins over charging, charging over the rest).
//!
//! Both energy (`energy_*`, `power_now`) and charge (`charge_*`,
//! `current_now`) style drivers are supported; only ratios are used, so the
//! units never need converting.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use super::{SourceError, line_trigger};
use crate::module::Trigger;

/// Charging state as reported by the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BatteryStatus {
    Charging,
    Discharging,
    NotCharging,
    Unknown,
    Full,
    /// No battery present.
    Disconnected,
}

impl BatteryStatus {
    fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Charging" => BatteryStatus::Charging,
            "Discharging" => BatteryStatus::Discharging,
            "Not charging" => BatteryStatus::NotCharging,
            "Full" => BatteryStatus::Full,
            _ => BatteryStatus::Unknown,
        }
    }

    /// Aggregation priority, higher wins.
    fn rank(self) -> u8 {
        match self {
            BatteryStatus::Discharging => 5,
            BatteryStatus::Charging => 4,
            BatteryStatus::NotCharging => 3,
            BatteryStatus::Full => 2,
            BatteryStatus::Unknown => 1,
            BatteryStatus::Disconnected => 0,
        }
    }

    /// Short tag shown in the bar.
    pub fn short(self) -> &'static str {
        match self {
            BatteryStatus::Charging => "CHR",
            BatteryStatus::Discharging => "BAT",
            BatteryStatus::NotCharging => "NOT",
            BatteryStatus::Unknown => "UNK",
            BatteryStatus::Full => "FULL",
            BatteryStatus::Disconnected => "",
        }
    }
}

/// Snapshot of all batteries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatteryInfo {
    pub status: BatteryStatus,
    /// 0..=100.
    pub remaining_pct: u8,
    /// Time to empty while discharging, time to full while charging.
    pub remaining_time: Option<Duration>,
}

impl BatteryInfo {
    pub fn disconnected() -> Self {
        Self {
            status: BatteryStatus::Disconnected,
            remaining_pct: 0,
            remaining_time: None,
        }
    }

    pub fn discharging(&self) -> bool {
        self.status == BatteryStatus::Discharging
    }
}

#[async_trait]
pub trait BatterySource: Send + Sync + 'static {
    async fn battery(&self) -> Result<BatteryInfo, SourceError>;
}

/// Default sysfs location of power supplies.
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// [`BatterySource`] over `/sys/class/power_supply/BAT*`.
#[derive(Clone, Debug)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::with_root(POWER_SUPPLY_ROOT)
    }
}

#[derive(Debug, Default)]
struct Reading {
    status: Option<BatteryStatus>,
    now: u64,
    full: u64,
    power: u64,
}

impl SysfsBattery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_one(dir: &Path) -> Result<Option<Reading>, SourceError> {
        if let Some(present) = read_u64(&dir.join("present")).await? {
            if present == 0 {
                return Ok(None);
            }
        }
        let status = match tokio::fs::read_to_string(dir.join("status")).await {
            Ok(raw) => Some(BatteryStatus::parse(&raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        let now = first_u64(dir, &["energy_now", "charge_now"]).await?;
        let full = first_u64(dir, &["energy_full", "charge_full"]).await?;
        let power = first_u64(dir, &["power_now", "current_now"]).await?;
        Ok(Some(Reading {
            status,
            now: now.unwrap_or(0),
            full: full.unwrap_or(0),
            power: power.unwrap_or(0),
        }))
    }
}

#[async_trait]
impl BatterySource for SysfsBattery {
    async fn battery(&self) -> Result<BatteryInfo, SourceError> {
        let mut dirs = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BatteryInfo::disconnected());
            }
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with("BAT") {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut total = Reading::default();
        let mut found = false;
        for dir in &dirs {
            let Some(r) = Self::read_one(dir).await? else {
                continue;
            };
            trace!(battery = %dir.display(), ?r, "battery reading");
            found = true;
            total.now += r.now;
            total.full += r.full;
            total.power += r.power;
            let status = r.status.unwrap_or(BatteryStatus::Unknown);
            if total.status.is_none_or(|s| status.rank() > s.rank()) {
                total.status = Some(status);
            }
        }
        if !found {
            return Ok(BatteryInfo::disconnected());
        }
        Ok(aggregate(total))
    }
}

fn aggregate(r: Reading) -> BatteryInfo {
    let status = r.status.unwrap_or(BatteryStatus::Unknown);
    let remaining_pct = if r.full == 0 {
        0
    } else {
        ((r.now.min(r.full) * 100) / r.full) as u8
    };
    let hours = match status {
        _ if r.power == 0 => None,
        BatteryStatus::Discharging => Some(r.now as f64 / r.power as f64),
        BatteryStatus::Charging => Some(r.full.saturating_sub(r.now) as f64 / r.power as f64),
        _ => None,
    };
    BatteryInfo {
        status,
        remaining_pct,
        remaining_time: hours.map(|h| Duration::from_secs_f64(h * 3600.0)),
    }
}

async fn read_u64(path: &Path) -> Result<Option<u64>, SourceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| SourceError::Parse(format!("{}: {err}", path.display()))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn first_u64(dir: &Path, names: &[&str]) -> Result<Option<u64>, SourceError> {
    for name in names {
        if let Some(v) = read_u64(&dir.join(name)).await? {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

/// Trigger firing on every `power_supply` uevent (plug, unplug, level change).
pub fn udev_monitor() -> Trigger {
    line_trigger("udevadm", &["monitor", "--subsystem-match=power_supply"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_battery(root: &Path, name: &str, files: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            fs::write(dir.join(file), format!("{content}\n")).unwrap();
        }
    }

    #[tokio::test]
    async fn reads_energy_style_battery() {
        let root = tempfile::tempdir().unwrap();
        write_battery(
            root.path(),
            "BAT0",
            &[
                ("status", "Discharging"),
                ("energy_now", "25000000"),
                ("energy_full", "50000000"),
                ("power_now", "10000000"),
            ],
        );
        fs::create_dir_all(root.path().join("AC")).unwrap();

        let info = SysfsBattery::with_root(root.path()).battery().await.unwrap();
        assert_eq!(info.status, BatteryStatus::Discharging);
        assert_eq!(info.remaining_pct, 50);
        assert_eq!(info.remaining_time, Some(Duration::from_secs(9000)));
    }

    #[tokio::test]
    async fn aggregates_charge_style_batteries() {
        let root = tempfile::tempdir().unwrap();
        write_battery(
            root.path(),
            "BAT0",
            &[("status", "Full"), ("charge_now", "4000000"), ("charge_full", "4000000")],
        );
        write_battery(
            root.path(),
            "BAT1",
            &[
                ("status", "Charging"),
                ("charge_now", "1000000"),
                ("charge_full", "4000000"),
                ("current_now", "1500000"),
            ],
        );

        let info = SysfsBattery::with_root(root.path()).battery().await.unwrap();
        assert_eq!(info.status, BatteryStatus::Charging);
        assert_eq!(info.remaining_pct, 62);
        assert_eq!(info.remaining_time, Some(Duration::from_secs(7200)));
    }

    #[tokio::test]
    async fn no_battery_is_disconnected() {
        let root = tempfile::tempdir().unwrap();
        write_battery(root.path(), "BAT0", &[("present", "0")]);
        let info = SysfsBattery::with_root(root.path()).battery().await.unwrap();
        assert_eq!(info, BatteryInfo::disconnected());

        let missing = SysfsBattery::with_root(root.path().join("nope"));
        assert_eq!(missing.battery().await.unwrap().status, BatteryStatus::Disconnected);
    }

    #[tokio::test]
    async fn garbage_values_are_parse_errors() {
        let root = tempfile::tempdir().unwrap();
        write_battery(root.path(), "BAT0", &[("status", "Full"), ("energy_now", "lots")]);
        let err = SysfsBattery::with_root(root.path()).battery().await.unwrap_err();
        assert_eq!(err.as_label(), "source_parse");
    }
}
