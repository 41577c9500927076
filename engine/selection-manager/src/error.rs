//! Error types for the selection manager

use thiserror::Error;

/// Result type alias for selection operations
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Invalid transitions of the selection state machine
///
/// Reaching the size limit is not an error; it is reported as
/// [`SelectionChange::AwaitingReplacement`](crate::SelectionChange::AwaitingReplacement).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("A replacement decision for {pending} is pending")]
    DecisionPending { pending: String },

    #[error("No addition is awaiting a replacement decision")]
    NoPendingAddition,

    #[error("Coin {id} is not selected")]
    NotSelected { id: String },

    #[error("Coin id must not be empty")]
    EmptyId,

    #[error("Configuration error: {0}")]
    Config(String),
}
