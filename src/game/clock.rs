//! Tick cadence.
//!
//! The speed setting changes how often a tick fires, not how large a tick
//! is: `dt` is always the wall-clock time accumulated since the previous
//! tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Player-selectable simulation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Speed {
    /// Timer stopped.
    Paused,
    /// One tick per 100 ms.
    #[default]
    Normal,
    /// One tick per 50 ms.
    Fast,
    /// One tick per 25 ms.
    VeryFast,
}

impl Speed {
    /// Interval between ticks, or `None` when paused.
    #[must_use]
    pub const fn interval(self) -> Option<Duration> {
        match self {
            Speed::Paused => None,
            Speed::Normal => Some(Duration::from_millis(100)),
            Speed::Fast => Some(Duration::from_millis(50)),
            Speed::VeryFast => Some(Duration::from_millis(25)),
        }
    }
}

/// Decides when ticks fire given elapsed wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickScheduler {
    speed: Speed,
    /// Wall time since the last tick fired.
    pending: Duration,
}

impl TickScheduler {
    /// Create a scheduler at the given speed.
    #[must_use]
    pub const fn new(speed: Speed) -> Self {
        Self {
            speed,
            pending: Duration::ZERO,
        }
    }

    /// Current speed.
    #[must_use]
    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Change speed. Pausing discards time accumulated towards the next tick.
    pub fn set_speed(&mut self, speed: Speed) {
        if speed == Speed::Paused {
            self.pending = Duration::ZERO;
        }
        self.speed = speed;
    }

    /// Feed elapsed wall time.
    ///
    /// Returns `Some(dt)` in seconds when a tick is due, where `dt` is all
    /// the time elapsed since the previous tick.
    pub fn advance(&mut self, elapsed: Duration) -> Option<f32> {
        let interval = self.speed.interval()?;
        self.pending += elapsed;
        if self.pending < interval {
            return None;
        }
        let dt = self.pending.as_secs_f32();
        self.pending = Duration::ZERO;
        Some(dt)
    }
}
