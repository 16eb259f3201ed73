//! Wifi block and the wpa_supplicant/dhclient controls behind its clicks.
//!
//! | state      | text                  | color    | clicks                  |
//! |------------|-----------------------|----------|-------------------------|
//! | connected  | `W: <ssid> (<q>%)`    | good     | left restart, right stop |
//! | connecting | `W: connecting...`    | degraded |                         |
//! | enabled    | `W: down`             | bad      | left restart            |
//! | absent     | hidden                |          |                         |
//!
//! The link quality comes from `iwconfig <iface>`; if it cannot be read the
//! tick fails and the block is hidden until the next one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::command::{Command, RunnerRef};
use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{ActionFuture, Button, Click, ClickContext, Color, Output, Segment};
use crate::sources::{SourceError, WifiSource};

const DHCLIENT: &str = "/usr/sbin/dhclient";
const WPA_SUPPLICANT: &str = "/usr/sbin/wpa_supplicant";
const PKILL: &str = "/usr/bin/pkill";

/// Starts and stops wifi through `sudo`.
#[derive(Clone)]
pub struct WifiControl {
    runner: RunnerRef,
    config: Option<String>,
    iface: Option<String>,
}

impl WifiControl {
    /// `config` is the wpa_supplicant config, `iface` the interface to bring
    /// up. Both are only needed to start wifi.
    pub fn new(runner: RunnerRef, config: Option<String>, iface: Option<String>) -> Self {
        Self {
            runner,
            config,
            iface,
        }
    }

    /// Releases the DHCP lease and kills wpa_supplicant.
    pub async fn stop(&self) -> Result<(), ModuleError> {
        info!("stopping wifi");
        self.runner.run(&Command::sudo(DHCLIENT).arg("-r")).await?;
        // pkill exits 1 when nothing matched.
        if let Err(err) = self
            .runner
            .run(&Command::sudo(PKILL).arg("wpa_supplicant"))
            .await
        {
            warn!(error = %err, "pkill wpa_supplicant");
        }
        info!("wifi stopped");
        Ok(())
    }

    /// Starts wpa_supplicant in the background, then asks for a lease.
    pub async fn start(&self) -> Result<(), ModuleError> {
        let (Some(config), Some(iface)) = (&self.config, &self.iface) else {
            return Err(ModuleError::fail(
                "wifi not started: wpa_supplicant config and interface are required",
            ));
        };
        info!(%iface, "starting wifi");
        let wpa = Command::sudo(WPA_SUPPLICANT).args(["-c", config.as_str(), "-i", iface.as_str(), "-B"]);
        self.runner.run(&wpa).await?;
        self.runner.run(&Command::sudo(DHCLIENT)).await?;
        info!("wifi started");
        Ok(())
    }

    pub async fn restart(&self) -> Result<(), ModuleError> {
        self.stop().await?;
        self.start().await
    }
}

pub struct Wifi {
    source: Arc<dyn WifiSource>,
    control: WifiControl,
    padding: u32,
}

impl Wifi {
    pub fn new(source: Arc<dyn WifiSource>, control: WifiControl, padding: u32) -> Self {
        Self {
            source,
            control,
            padding,
        }
    }

    async fn quality(&self, iface: &str) -> Result<u32, ModuleError> {
        let out = self.control.runner.run(&Command::new("iwconfig").arg(iface)).await?;
        let (num, den) = parse_link_quality(&out.stdout).ok_or_else(|| {
            SourceError::Parse(format!("no link quality for {iface}: {:?}", out.stdout.trim()))
        })?;
        Ok(percent(num, den))
    }

    fn restart_action(&self) -> impl Fn(ClickContext) -> ActionFuture + Send + Sync + 'static {
        let control = self.control.clone();
        move |ctx: ClickContext| {
            let control = control.clone();
            Box::pin(async move {
                let res = control.restart().await;
                ctx.refresh.now();
                res
            }) as ActionFuture
        }
    }
}

#[async_trait]
impl Module for Wifi {
    fn name(&self) -> &str {
        "wifi"
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        let Some(info) = self.source.wifi().await? else {
            return Ok(Output::empty());
        };
        let seg = if info.connected() {
            let pct = self.quality(&info.name).await?;
            let ssid = info.ssid.as_deref().unwrap_or_default();
            let control = self.control.clone();
            Segment::new(format!("W: {ssid} ({pct}%)"))
                .with_color(Color::Good)
                .with_click(
                    Click::new()
                        .on(Button::Left, self.restart_action())
                        .on(Button::Right, move |ctx: ClickContext| {
                            let control = control.clone();
                            async move {
                                let res = control.stop().await;
                                ctx.refresh.now();
                                res
                            }
                        }),
                )
        } else if info.connecting() {
            Segment::new("W: connecting...").with_color(Color::Degraded)
        } else if info.enabled() {
            Segment::new("W: down")
                .with_color(Color::Bad)
                .with_click(Click::left(self.restart_action()))
        } else {
            return Ok(Output::empty());
        };
        Ok(seg.with_padding(self.padding).into())
    }
}

/// Parses `Link Quality=NN/MM` out of `iwconfig` output.
fn parse_link_quality(stdout: &str) -> Option<(u32, u32)> {
    let rest = &stdout[stdout.find("Link Quality=")? + "Link Quality=".len()..];
    let field = rest.split_whitespace().next()?;
    let (num, den) = field.split_once('/')?;
    let num: u32 = num.parse().ok()?;
    let den: u32 = den.parse().ok()?;
    (den > 0).then_some((num, den))
}

/// `num/den` as a percentage, capped at 100.
fn percent(num: u32, den: u32) -> u32 {
    (u64::from(num.min(den)) * 100 / u64::from(den)) as u32
}
