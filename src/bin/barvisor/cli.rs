use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "barvisor")]
#[command(version)]
#[command(about = "i3bar/swaybar status line: battery, disks, network, wifi, clock")]
pub struct Cli {
    /// Email for the LastPass account (enables the LastPass block)
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Path to the wpa_supplicant config used when restarting wifi
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Interface to connect to wifi through
    #[arg(long, value_name = "IFACE")]
    pub iface: Option<String>,

    /// Log directory (default: $HOME/.local/share/barvisor)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Per-tick timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub tick_timeout: u64,
}

impl Cli {
    /// The LastPass email, ignoring an empty flag.
    pub fn lastpass_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}
