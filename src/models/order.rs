//! Production order model.

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A customer order made of dependent operations and due by `end_date`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProductionOrder {
    /// Unique order identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Number of units ordered.
    pub quantity: u32,
    /// First day work may start.
    pub start_date: NaiveDate,
    /// Deadline. The order is on time if its last operation finishes on or
    /// before this day.
    pub end_date: NaiveDate,
    /// Identifiers of the operations that make up the order.
    pub operations: Vec<String>,
}

impl ProductionOrder {
    pub fn new(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            quantity: 0,
            start_date,
            end_date,
            operations: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_operation(mut self, id: impl Into<String>) -> Self {
        self.operations.push(id.into());
        self
    }

    /// Number of operations that must complete before the order is done.
    pub fn total_operations(&self) -> usize {
        self.operations.len()
    }
}
