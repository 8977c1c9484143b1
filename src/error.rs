//! Error type for malformed input and invalid configuration.
//!
//! Only structural problems are errors. An operation that cannot be staffed
//! or whose prerequisites never complete is a valid input; it shows up as a
//! lower [`Fitness`](crate::hs::Fitness) instead.

use std::fmt;

/// Errors raised before the optimizer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarmonyError {
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// Two entities of the same kind share an identifier.
    DuplicateId {
        /// Entity kind (`"worker"`, `"machine"`, ...).
        kind: &'static str,
        /// The repeated identifier.
        id: String,
    },
    /// An operation references a production order that does not exist.
    UnknownOrder {
        /// Operation identifier.
        operation: String,
        /// Missing order identifier.
        order: String,
    },
    /// A production order lists an operation that does not exist.
    UnknownOperation {
        /// Order identifier.
        order: String,
        /// Missing operation identifier.
        operation: String,
    },
    /// A production order lists the same operation more than once.
    RepeatedOperation {
        /// Order identifier.
        order: String,
        /// Repeated operation identifier.
        operation: String,
    },
    /// A production order lists an operation that belongs to another order.
    ForeignOperation {
        /// Order listing the operation.
        order: String,
        /// Operation identifier.
        operation: String,
        /// Order named by the operation.
        owner: String,
    },
    /// An operation is missing from the operation list of its own order.
    UnlistedOperation {
        /// Operation identifier.
        operation: String,
        /// Order named by the operation.
        order: String,
    },
    /// A calendar date string could not be parsed as `YYYY-MM-DD`.
    InvalidDate(String),
    /// A shift index outside `0..SHIFTS_PER_DAY`.
    ShiftOutOfRange(usize),
}

impl fmt::Display for HarmonyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmonyError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            HarmonyError::DuplicateId { kind, id } => write!(f, "duplicate {kind} id '{id}'"),
            HarmonyError::UnknownOrder { operation, order } => write!(
                f,
                "operation '{operation}' references unknown production order '{order}'"
            ),
            HarmonyError::UnknownOperation { order, operation } => write!(
                f,
                "production order '{order}' lists unknown operation '{operation}'"
            ),
            HarmonyError::RepeatedOperation { order, operation } => write!(
                f,
                "production order '{order}' lists operation '{operation}' more than once"
            ),
            HarmonyError::ForeignOperation {
                order,
                operation,
                owner,
            } => write!(
                f,
                "production order '{order}' lists operation '{operation}' of order '{owner}'"
            ),
            HarmonyError::UnlistedOperation { operation, order } => write!(
                f,
                "operation '{operation}' is not listed by its production order '{order}'"
            ),
            HarmonyError::InvalidDate(raw) => {
                write!(f, "invalid date '{raw}', expected YYYY-MM-DD")
            }
            HarmonyError::ShiftOutOfRange(shift) => {
                write!(f, "shift index {shift} is out of range")
            }
        }
    }
}

impl std::error::Error for HarmonyError {}
