use std::sync::Arc;

use async_trait::async_trait;

use super::ibytes;
use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{Color, Output, Segment};
use crate::sources::DiskSource;

/// Free space of one mount point: `"/home: 120 GiB"`.
///
/// Bad below 20% free, degraded below 33%.
pub struct Disk {
    source: Arc<dyn DiskSource>,
    path: String,
    name: String,
    padding: u32,
}

impl Disk {
    pub fn new(source: Arc<dyn DiskSource>, path: impl Into<String>, padding: u32) -> Self {
        let path = path.into();
        Self {
            source,
            name: format!("disk:{path}"),
            path,
            padding,
        }
    }
}

#[async_trait]
impl Module for Disk {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        let info = self.source.disk(&self.path).await?;
        let frac = info.avail_frac();
        let color = if frac < 0.2 {
            Some(Color::Bad)
        } else if frac < 0.33 {
            Some(Color::Degraded)
        } else {
            None
        };
        Ok(Segment::new(format!("{}: {}", self.path, ibytes(info.available)))
            .with_color_opt(color)
            .with_padding(self.padding)
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{DiskInfo, SourceError};

    struct Fixed(u64, u64);

    #[async_trait]
    impl DiskSource for Fixed {
        async fn disk(&self, _path: &str) -> Result<DiskInfo, SourceError> {
            Ok(DiskInfo {
                available: self.0,
                total: self.1,
            })
        }
    }

    async fn render(available: u64, total: u64) -> Segment {
        let block = Disk::new(Arc::new(Fixed(available, total)), "/home", 25);
        let out = block.produce(&TickContext::detached()).await.unwrap();
        out.segments()[0].clone()
    }

    #[tokio::test]
    async fn colors_follow_free_fraction() {
        const GIB: u64 = 1024 * 1024 * 1024;

        let plenty = render(120 * GIB, 200 * GIB).await;
        assert_eq!(plenty, Segment::new("/home: 120 GiB").with_padding(25));

        let low = render(60 * GIB, 200 * GIB).await;
        assert_eq!(low.color(), Some(Color::Degraded));

        let critical = render(GIB / 2, 200 * GIB).await;
        assert_eq!(critical.text(), "/home: 512 MiB");
        assert_eq!(critical.color(), Some(Color::Bad));
    }

    #[test]
    fn name_carries_the_mount_point() {
        let block = Disk::new(Arc::new(Fixed(0, 0)), "/", 0);
        assert_eq!(block.name(), "disk:/");
    }
}
