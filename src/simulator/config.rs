//! Simulation configuration.

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the schedule simulator.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use u_harmony::simulator::SimulationConfig;
///
/// let config = SimulationConfig::default()
///     .with_start_date(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
///     .with_horizon_days(30)
///     .with_rest_between_shifts(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// First simulated calendar day.
    pub start_date: NaiveDate,

    /// Number of simulated days. The run never exceeds `horizon_days * 4`
    /// shifts.
    pub horizon_days: usize,

    /// Working hours per shift. Scales output and cost of every pair.
    pub shift_hours: f64,

    /// Forbid a worker from working two consecutive shifts.
    pub rest_between_shifts: bool,

    /// Recycled workers above this quality go to the most demanding
    /// ready operation first.
    pub recycle_quality_threshold: f64,

    /// Recycled machines above this productivity go to the most demanding
    /// ready operation first.
    pub recycle_productivity_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default(),
            horizon_days: 60,
            shift_hours: 5.5,
            rest_between_shifts: true,
            recycle_quality_threshold: 0.8,
            recycle_productivity_threshold: 0.8,
        }
    }
}

impl SimulationConfig {
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn with_horizon_days(mut self, days: usize) -> Self {
        self.horizon_days = days;
        self
    }

    pub fn with_shift_hours(mut self, hours: f64) -> Self {
        self.shift_hours = hours;
        self
    }

    pub fn with_rest_between_shifts(mut self, rest: bool) -> Self {
        self.rest_between_shifts = rest;
        self
    }

    pub fn with_recycle_thresholds(mut self, quality: f64, productivity: f64) -> Self {
        self.recycle_quality_threshold = quality;
        self.recycle_productivity_threshold = productivity;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.horizon_days == 0 {
            return Err("horizon_days must be at least 1".into());
        }
        if !self.shift_hours.is_finite() || self.shift_hours <= 0.0 {
            return Err(format!(
                "shift_hours must be positive, got {}",
                self.shift_hours
            ));
        }
        Ok(())
    }
}
