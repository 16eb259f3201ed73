//! # Status blocks.
//!
//! Concrete [`Module`](crate::Module)s of the stock bar. Each block asks its
//! data source for a snapshot and formats it; none of them touches the OS
//! directly, so they are tested against fakes.
//!
//! | block                 | source            | schedule used by the binary       |
//! |-----------------------|-------------------|-----------------------------------|
//! | [`LastPass`]          | `lpass status`    | every 1s                          |
//! | [`Disk`]              | [`DiskSource`](crate::sources::DiskSource) | every 3s |
//! | [`Wifi`]              | [`WifiSource`](crate::sources::WifiSource) | link monitor + every 5s |
//! | [`Ethernet`]          | [`NetSource`](crate::sources::NetSource)   | link monitor + every 5s |
//! | [`Battery`]           | [`BatterySource`](crate::sources::BatterySource) | udev monitor + every 3s |
//! | [`Clock`]             | local time        | aligned to 1s                     |

mod battery;
mod clock;
mod disk;
mod ethernet;
mod lastpass;
mod wifi;

pub use battery::Battery;
pub use clock::Clock;
pub use disk::Disk;
pub use ethernet::Ethernet;
pub use lastpass::LastPass;
pub use wifi::{Wifi, WifiControl};

const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Formats a byte count with binary units: `"512 B"`, `"1.5 GiB"`, `"120 GiB"`.
///
/// Values below 10 keep one decimal.
pub fn ibytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if value < 10.0 {
        format!("{value:.1} {}", UNITS[unit])
    } else {
        format!("{value:.0} {}", UNITS[unit])
    }
}
