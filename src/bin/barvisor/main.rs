use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};

use barvisor::blocks::{Battery, Clock, Disk, Ethernet, LastPass, Wifi, WifiControl};
use barvisor::command::{RunnerRef, SystemRunner};
use barvisor::render::i3bar::read_clicks;
use barvisor::sources::{DfDisk, DiskSource, SysfsBattery, SysfsNet, SysfsWifi, battery, net};
use barvisor::{Bar, BarConfig, I3bar, LogWriter, Module, ModuleSpec, Schedule, Subscribe};

mod cli;
mod logging;

use cli::Cli;

const DISKS: [&str; 2] = ["/", "/home"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_file = logging::init(cli.log_dir.clone())?;
    info!(file = %log_file.display(), "barvisor started");
    if let Some(user) = std::env::var_os("USER") {
        info!(user = %user.to_string_lossy(), "running as");
    }

    let cfg = BarConfig {
        tick_timeout: Duration::from_secs(cli.tick_timeout),
        ..BarConfig::default()
    };
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut bar = Bar::builder(cfg.clone())
        .renderer(I3bar::new(tokio::io::stdout(), cfg.palette.clone()))
        .subscribers(subscribers)
        .build();
    add_blocks(&mut bar, &cli, &cfg, SystemRunner::arc());
    info!(modules = bar.len(), "blocks registered");

    let router = bar.router();
    let clicks = tokio::spawn(async move {
        if let Err(err) = read_clicks(BufReader::new(tokio::io::stdin()), router).await {
            warn!(error = %err, "click stream failed");
        }
    });

    let res = bar.run().await;
    clicks.abort();
    info!("barvisor stopped");
    res.context("bar stopped with an error")
}

/// Registers the stock blocks in display order.
fn add_blocks(bar: &mut Bar, cli: &Cli, cfg: &BarConfig, runner: RunnerRef) {
    let padding = cfg.padding;

    if let Some(email) = cli.lastpass_email() {
        info!("email given, enabling lastpass status");
        bar.add(spec(
            LastPass::new(Arc::clone(&runner), email, padding),
            Schedule::every(Duration::from_secs(1)),
            cfg,
        ));
    }

    let disks: Arc<dyn DiskSource> = Arc::new(DfDisk::new(Arc::clone(&runner)));
    for path in DISKS {
        bar.add(spec(
            Disk::new(Arc::clone(&disks), path, padding),
            Schedule::every(Duration::from_secs(3)),
            cfg,
        ));
    }

    let control = WifiControl::new(Arc::clone(&runner), cli.config.clone(), cli.iface.clone());
    let wifi = SysfsWifi::new(Arc::clone(&runner));
    bar.add(spec(
        Wifi::new(Arc::new(wifi), control, padding),
        Schedule::push(net::link_monitor()).and_every(Duration::from_secs(5)),
        cfg,
    ));

    let wired = SysfsNet::new(Arc::clone(&runner));
    bar.add(spec(
        Ethernet::new(Arc::new(wired), "e", padding),
        Schedule::push(net::link_monitor()).and_every(Duration::from_secs(5)),
        cfg,
    ));

    bar.add(spec(
        Battery::new(Arc::new(SysfsBattery::new()), padding),
        Schedule::push(battery::udev_monitor()).and_every(Duration::from_secs(3)),
        cfg,
    ));

    bar.add(spec(Clock::new(), Schedule::aligned(Duration::from_secs(1)), cfg));
}

fn spec(module: impl Module, schedule: Schedule, cfg: &BarConfig) -> ModuleSpec {
    ModuleSpec::with_defaults(Arc::new(module), schedule, cfg)
}
