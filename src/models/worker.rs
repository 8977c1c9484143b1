//! Worker model.

use chrono::NaiveDate;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::SHIFTS_PER_DAY;
use crate::error::HarmonyError;

/// A worker that can staff operations requiring its position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Worker {
    /// Unique worker identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Position tag matched against [`Operation::required_position`](super::Operation).
    pub position: String,
    /// Output multiplier (1.0 = nominal).
    pub productivity: f64,
    /// Fraction of output that meets quality (0.0 to 1.0).
    pub quality: f64,
    /// Cost per working hour.
    pub hourly_cost: f64,
    /// Shifts the worker is rostered for, per calendar day.
    ///
    /// A day without an entry means the worker is off all day.
    pub availability: HashMap<NaiveDate, [bool; SHIFTS_PER_DAY]>,
}

impl Worker {
    /// Creates a worker with nominal productivity and quality and no roster.
    pub fn new(id: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            position: position.into(),
            productivity: 1.0,
            quality: 1.0,
            hourly_cost: 0.0,
            availability: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_productivity(mut self, productivity: f64) -> Self {
        self.productivity = productivity;
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_hourly_cost(mut self, cost: f64) -> Self {
        self.hourly_cost = cost;
        self
    }

    /// Sets the roster for one day.
    pub fn with_available_shifts(mut self, date: NaiveDate, shifts: [bool; SHIFTS_PER_DAY]) -> Self {
        self.availability.insert(date, shifts);
        self
    }

    /// Marks one shift of a `YYYY-MM-DD` day as worked.
    ///
    /// # Errors
    /// [`HarmonyError::InvalidDate`] for an unparsable day and
    /// [`HarmonyError::ShiftOutOfRange`] for a shift index `>= 4`.
    pub fn mark_available(&mut self, day: &str, shift: usize) -> Result<(), HarmonyError> {
        if shift >= SHIFTS_PER_DAY {
            return Err(HarmonyError::ShiftOutOfRange(shift));
        }
        let date = parse_date(day)?;
        self.availability.entry(date).or_insert([false; SHIFTS_PER_DAY])[shift] = true;
        Ok(())
    }

    /// Whether the worker is rostered for `shift` on `date`.
    pub fn is_available(&self, date: NaiveDate, shift: usize) -> bool {
        self.availability
            .get(&date)
            .and_then(|shifts| shifts.get(shift))
            .copied()
            .unwrap_or(false)
    }

    /// Combined ranking score, productivity × quality.
    pub fn score(&self) -> f64 {
        self.productivity * self.quality
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, HarmonyError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| HarmonyError::InvalidDate(raw.to_string()))
}
