//! Display-only cost estimate for an analysis run.
//!
//! The analysis backend is billed per second of wall time, plus a fixed
//! overhead for container start-up. Both figures are calibration constants.

use serde::Serialize;

/// Seconds added to every run on top of the reported processing time.
pub const FIXED_OVERHEAD_SECONDS: f64 = 15.0;

/// Price of one second of backend time, in USD.
pub const PRICE_PER_SECOND: f64 = 0.0007449;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Billed seconds, overhead included
    pub elapsed_seconds: f64,
    /// Estimated cost in USD
    pub cost: f64,
}

impl CostEstimate {
    pub fn from_run_time_ms(run_time_ms: f64) -> Self {
        let run_time_ms = if run_time_ms.is_finite() { run_time_ms.max(0.0) } else { 0.0 };
        let elapsed_seconds = run_time_ms / 1000.0 + FIXED_OVERHEAD_SECONDS;
        Self {
            elapsed_seconds,
            cost: elapsed_seconds * PRICE_PER_SECOND,
        }
    }

    /// Elapsed seconds with two decimals.
    pub fn elapsed_display(&self) -> String {
        format!("{:.2}", self.elapsed_seconds)
    }

    /// Cost with two decimals.
    pub fn cost_display(&self) -> String {
        format!("{:.2}", self.cost)
    }
}
