//! Machine model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A machine that can be paired with a worker on operations of its type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Type tag matched against an operation's required machine type.
    pub machine_type: String,
    /// Cost per running hour.
    pub hourly_cost: f64,
    /// Output multiplier (1.0 = nominal).
    pub productivity: f64,
}

impl Machine {
    pub fn new(id: impl Into<String>, machine_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            machine_type: machine_type.into(),
            hourly_cost: 0.0,
            productivity: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_hourly_cost(mut self, cost: f64) -> Self {
        self.hourly_cost = cost;
        self
    }

    pub fn with_productivity(mut self, productivity: f64) -> Self {
        self.productivity = productivity;
        self
    }
}
