//! # Disk space.

use async_trait::async_trait;

use super::SourceError;
use crate::command::{Command, RunnerRef};

/// Free and total bytes of one filesystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskInfo {
    pub available: u64,
    pub total: u64,
}

impl DiskInfo {
    /// Fraction of the filesystem still available. An empty filesystem
    /// (`total == 0`) reports `1.0`.
    pub fn avail_frac(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.available as f64 / self.total as f64
    }
}

#[async_trait]
pub trait DiskSource: Send + Sync + 'static {
    async fn disk(&self, path: &str) -> Result<DiskInfo, SourceError>;
}

/// [`DiskSource`] running `df -B1 --output=avail,size <path>`.
#[derive(Clone)]
pub struct DfDisk {
    runner: RunnerRef,
}

impl DfDisk {
    pub fn new(runner: RunnerRef) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DiskSource for DfDisk {
    async fn disk(&self, path: &str) -> Result<DiskInfo, SourceError> {
        let cmd = Command::new("df").args(["-B1", "--output=avail,size", path]);
        let out = self.runner.run(&cmd).await?;
        parse_df(&out.stdout)
    }
}

/// Parses the two-column `df` output (header line, then `avail size`).
fn parse_df(stdout: &str) -> Result<DiskInfo, SourceError> {
    let row = stdout
        .lines()
        .skip(1)
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| SourceError::Parse(format!("df printed no data row: {stdout:?}")))?;
    let mut cols = row.split_whitespace().map(str::parse::<u64>);
    match (cols.next(), cols.next()) {
        (Some(Ok(available)), Some(Ok(total))) => Ok(DiskInfo { available, total }),
        _ => Err(SourceError::Parse(format!("bad df row: {row:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;

    #[test]
    fn parses_df_output() {
        let out = "       Avail      1B-blocks\n 53687091200 214748364800\n";
        let info = parse_df(out).unwrap();
        assert_eq!(info.available, 53_687_091_200);
        assert_eq!(info.total, 214_748_364_800);
        assert!((info.avail_frac() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(parse_df("Avail 1B-blocks\n").is_err());
        assert!(parse_df("Avail 1B-blocks\n12 abc\n").is_err());
        assert_eq!(DiskInfo { available: 0, total: 0 }.avail_frac(), 1.0);
    }

    #[tokio::test]
    async fn runs_df_for_the_path() {
        let runner = FakeRunner::new();
        runner.reply("df -B1 --output=avail,size /home", Ok("Avail 1B-blocks\n10 40\n"));
        let disk = DfDisk::new(runner.clone());

        let info = disk.disk("/home").await.unwrap();
        assert_eq!(info, DiskInfo { available: 10, total: 40 });
        assert_eq!(runner.calls(), vec!["df -B1 --output=avail,size /home"]);
    }
}
