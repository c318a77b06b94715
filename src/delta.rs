// src/delta.rs
use std::fmt;

use serde::Serialize;

/// Day-over-day change between two polled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyDelta {
    pub previous: i64,
    pub current: i64,
}

impl DailyDelta {
    pub fn new(previous: i64, current: i64) -> Self {
        Self { previous, current }
    }

    /// Saturates at the `i64` bounds.
    pub fn change(&self) -> i64 {
        self.current.saturating_sub(self.previous)
    }
}

/// Always signed: `+20`, `-10`, `+0`.
impl fmt::Display for DailyDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.change())
    }
}
