//! # Bar configuration.
//!
//! [`BarConfig`] holds the settings shared by the whole bar. It is built once
//! (by the binary, from CLI flags) and then shared read-only.
//!
//! Config is used in two ways:
//! 1. **Bar creation**: `Bar::builder(config)`
//! 2. **ModuleSpec defaults**: `ModuleSpec::with_defaults(module, schedule, &config)`
//!
//! ## Sentinel values
//! - `tick_timeout = 0s` → no timeout (treated as `None` by `ModuleSpec::with_defaults`)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::output::Color;

/// Concrete colors for the semantic [`Color`] tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub good: String,
    pub bad: String,
    pub degraded: String,
}

impl Palette {
    /// Returns the concrete color (`#rrggbb`) for a tag.
    pub fn resolve(&self, color: Color) -> &str {
        match color {
            Color::Good => &self.good,
            Color::Bad => &self.bad,
            Color::Degraded => &self.degraded,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            good: "#00ff00".into(),
            bad: "#ff0000".into(),
            degraded: "#ffff00".into(),
        }
    }
}

/// Global configuration for the bar runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for module actors to stop (`0s` = do not wait)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `tick_timeout`: default per-tick timeout (`0s` = no timeout)
/// - `padding`: default segment width used by the built-in blocks
/// - `palette`: concrete colors handed to renderers
#[derive(Clone, Debug)]
pub struct BarConfig {
    /// Maximum time to wait for module actors after shutdown was requested.
    ///
    /// If exceeded, `Bar::run` returns `RuntimeError::GraceExceeded` with the
    /// modules still inside a tick.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers lagging more than `bus_capacity` events skip the
    /// oldest ones.
    pub bus_capacity: usize,

    /// Default per-tick timeout.
    pub tick_timeout: Duration,

    /// Default segment padding (minimum width, in pixels for i3bar).
    pub padding: u32,

    pub palette: Palette,
}

impl BarConfig {
    /// Returns the default per-tick timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per tick
    #[inline]
    pub fn default_tick_timeout(&self) -> Option<Duration> {
        if self.tick_timeout == Duration::ZERO {
            None
        } else {
            Some(self.tick_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for BarConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s` (a bar restart should be quick)
    /// - `bus_capacity = 1024`
    /// - `tick_timeout = 10s`
    /// - `padding = 25`
    /// - `palette`: green / red / yellow
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            tick_timeout: Duration::from_secs(10),
            padding: 25,
            palette: Palette::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        let mut cfg = BarConfig::default();
        assert_eq!(cfg.default_tick_timeout(), Some(Duration::from_secs(10)));
        cfg.tick_timeout = Duration::ZERO;
        assert_eq!(cfg.default_tick_timeout(), None);
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn palette_resolves_tags() {
        let p = Palette::default();
        assert_eq!(p.resolve(Color::Good), "#00ff00");
        assert_eq!(p.resolve(Color::Bad), "#ff0000");
        assert_eq!(p.resolve(Color::Degraded), "#ffff00");
    }
}
