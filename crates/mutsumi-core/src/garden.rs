//! Cucumber garden mini-game.
//!
//! Progress runs from 0 to 100. It grows on its own as time passes, and
//! watering adds a fixed amount. Watering a fully grown cucumber harvests
//! it and starts over.

use chrono::{DateTime, Utc};

pub const MAX_PROGRESS: f64 = 100.0;
pub const GROWTH_PER_SECOND: f64 = 0.1;
pub const WATER_BOOST: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaterOutcome {
    Watered { progress: f64 },
    Harvested,
}

#[derive(Debug, Clone)]
pub struct Garden {
    progress: f64,
    updated_at: DateTime<Utc>,
}

impl Default for Garden {
    fn default() -> Self {
        Self::planted_at(Utc::now())
    }
}

impl Garden {
    pub fn planted_at(now: DateTime<Utc>) -> Self {
        Self {
            progress: 0.0,
            updated_at: now,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress_at(Utc::now())
    }

    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.updated_at).num_milliseconds().max(0) as f64;
        (self.progress + elapsed_ms / 1000.0 * GROWTH_PER_SECOND).min(MAX_PROGRESS)
    }

    pub fn water(&mut self) -> WaterOutcome {
        self.water_at(Utc::now())
    }

    pub fn water_at(&mut self, now: DateTime<Utc>) -> WaterOutcome {
        let current = self.progress_at(now);
        self.updated_at = now;
        if current >= MAX_PROGRESS {
            self.progress = 0.0;
            WaterOutcome::Harvested
        } else {
            self.progress = (current + WATER_BOOST).min(MAX_PROGRESS);
            WaterOutcome::Watered {
                progress: self.progress,
            }
        }
    }
}
