use std::fmt::Write;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::ModuleError;
use crate::module::{Module, TickContext};
use crate::output::{Output, Segment};

/// Default format, trailing spaces included (the clock sits at the right
/// edge and has no padding).
pub const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S  ";

/// Local time, meant for [`Schedule::aligned`](crate::Schedule::aligned).
pub struct Clock {
    format: String,
    now: fn() -> DateTime<Local>,
}

impl Clock {
    pub fn new() -> Self {
        Self::with_format(CLOCK_FORMAT)
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            now: Local::now,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    async fn produce(&self, _ctx: &TickContext) -> Result<Output, ModuleError> {
        let mut text = String::new();
        write!(text, "{}", (self.now)().format(&self.format))
            .map_err(|_| ModuleError::fail(format!("invalid clock format {:?}", self.format)))?;
        Ok(Segment::new(text).into())
    }
}
