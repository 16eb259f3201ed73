use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{Color, Output, Segment};
use crate::sources::NetSource;

/// Wired link matching a name prefix (`"e"` catches `eth0`, `enp3s0`, ...).
///
/// Shows the first address when connected (`E: 10.0.0.2`, or `E: <no ip>`),
/// `E: connecting...` while the link negotiates, `E: down` when it exists
/// but is down. Hidden when no interface matches.
pub struct Ethernet {
    source: Arc<dyn NetSource>,
    prefix: String,
    padding: u32,
}

impl Ethernet {
    pub fn new(source: Arc<dyn NetSource>, prefix: impl Into<String>, padding: u32) -> Self {
        Self {
            source,
            prefix: prefix.into(),
            padding,
        }
    }
}

#[async_trait]
impl Module for Ethernet {
    fn name(&self) -> &str {
        "ethernet"
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        let Some(net) = self.source.net(&self.prefix).await? else {
            return Ok(Output::empty());
        };
        let seg = if net.connected() {
            let ip = net
                .ips
                .first()
                .map_or_else(|| "<no ip>".to_string(), ToString::to_string);
            Segment::new(format!("E: {ip}")).with_color(Color::Good)
        } else if net.connecting() {
            Segment::new("E: connecting...").with_color(Color::Degraded)
        } else if net.enabled() {
            Segment::new("E: down").with_color(Color::Bad)
        } else {
            return Ok(Output::empty());
        };
        Ok(seg.with_padding(self.padding).into())
    }
}
