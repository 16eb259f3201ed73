use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{Color, Output, Segment};
use crate::sources::{BatterySource, BatteryStatus};

const LOW_PCT: u8 = 20;
const LOW_TIME: Duration = Duration::from_secs(30 * 60);

/// `Bat: 73% (BAT)`, bad while discharging below 20% or 30 minutes left.
/// Hidden when no battery is present.
pub struct Battery {
    source: Arc<dyn BatterySource>,
    padding: u32,
}

impl Battery {
    pub fn new(source: Arc<dyn BatterySource>, padding: u32) -> Self {
        Self { source, padding }
    }
}

#[async_trait]
impl Module for Battery {
    fn name(&self) -> &str {
        "battery"
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        let info = self.source.battery().await?;
        if info.status == BatteryStatus::Disconnected {
            return Ok(Output::empty());
        }
        let low = info.discharging()
            && (info.remaining_pct < LOW_PCT || info.remaining_time.is_some_and(|t| t < LOW_TIME));
        let seg = Segment::new(format!("Bat: {}% ({})", info.remaining_pct, info.status.short()))
            .with_color_opt(low.then_some(Color::Bad))
            .with_padding(self.padding);
        Ok(seg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{BatteryInfo, SourceError};

    struct Fixed(BatteryInfo);

    #[async_trait]
    impl BatterySource for Fixed {
        async fn battery(&self) -> Result<BatteryInfo, SourceError> {
            Ok(self.0.clone())
        }
    }

    async fn render(status: BatteryStatus, pct: u8, mins: Option<u64>) -> Output {
        let info = BatteryInfo {
            status,
            remaining_pct: pct,
            remaining_time: mins.map(|m| Duration::from_secs(m * 60)),
        };
        Battery::new(Arc::new(Fixed(info)), 25)
            .produce(&TickContext::detached())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn formats_status_and_percentage() {
        let out = render(BatteryStatus::Charging, 73, Some(40)).await;
        assert_eq!(out, Output::one(Segment::new("Bat: 73% (CHR)").with_padding(25)));

        let full = render(BatteryStatus::Full, 100, None).await;
        assert_eq!(full.segments()[0].text(), "Bat: 100% (FULL)");
    }

    #[tokio::test]
    async fn low_while_discharging_is_bad() {
        let by_pct = render(BatteryStatus::Discharging, 15, Some(90)).await;
        assert_eq!(by_pct.segments()[0].color(), Some(Color::Bad));

        let by_time = render(BatteryStatus::Discharging, 45, Some(20)).await;
        assert_eq!(by_time.segments()[0].text(), "Bat: 45% (BAT)");
        assert_eq!(by_time.segments()[0].color(), Some(Color::Bad));

        let fine = render(BatteryStatus::Discharging, 45, Some(120)).await;
        assert_eq!(fine.segments()[0].color(), None);

        let charging_low = render(BatteryStatus::Charging, 5, Some(10)).await;
        assert_eq!(charging_low.segments()[0].color(), None);
    }

    #[tokio::test]
    async fn hidden_when_disconnected() {
        assert!(render(BatteryStatus::Disconnected, 0, None).await.is_empty());
    }
}
