//! Daily log file and the global `tracing` subscriber.
//!
//! Logs go to `<dir>/barvisor_YYYYMMDD.log`, appended. stdout belongs to the
//! bar protocol, so nothing is ever logged there.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use tracing_subscriber::EnvFilter;

const PROGRAM: &str = "barvisor";

/// `$HOME/.local/share/barvisor`.
pub fn default_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".local").join("share").join(PROGRAM))
}

/// Creates `dir` when missing; fails when it exists but is not a directory.
pub fn prepare_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => bail!("{} exists but it is not a directory", dir.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .with_context(|| format!("could not create {}", dir.display())),
        Err(err) => Err(err).with_context(|| format!("could not stat {}", dir.display())),
    }
}

pub fn file_name(date: NaiveDate) -> String {
    format!("{PROGRAM}_{}.log", date.format("%Y%m%d"))
}

/// Installs the global subscriber writing to today's log file and returns
/// the file path. `RUST_LOG` overrides the default `info` level.
pub fn init(dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir,
        None => default_dir()?,
    };
    prepare_dir(&dir)?;

    let path = dir.join(file_name(Local::now().date_naive()));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("could not install logger: {err}"))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        prepare_dir(&dir).unwrap();
        assert!(dir.is_dir());
        prepare_dir(&dir).unwrap();
    }

    #[test]
    fn rejects_a_file_in_place_of_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("barvisor");
        fs::write(&file, "").unwrap();
        let err = prepare_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn daily_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(date), "barvisor_20240309.log");
    }
}
