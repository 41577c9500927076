use crate::rules::ReplaceOption;
use serde::Serialize;

/// Notice shown when a coin joins the selection
pub const COIN_ADDED_NOTICE: &str = "Coin added successfully";

/// Notice shown when a coin leaves the selection
pub const COIN_REMOVED_NOTICE: &str = "Coin removed successfully";

/// A committed change to the selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionEvent {
    Added { id: String },
    Removed { id: String },
    /// One swap: `removed` was evicted to make room for `added`
    Replaced { removed: String, added: String },
}

impl SelectionEvent {
    /// User-visible notices, in display order
    pub fn notices(&self) -> Vec<&'static str> {
        match self {
            Self::Added { .. } => vec![COIN_ADDED_NOTICE],
            Self::Removed { .. } => vec![COIN_REMOVED_NOTICE],
            Self::Replaced { .. } => vec![COIN_REMOVED_NOTICE, COIN_ADDED_NOTICE],
        }
    }
}

/// Result of an add/remove/toggle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// The selection changed and was persisted
    Applied(SelectionEvent),

    /// Nothing to do (already selected, or not selected)
    Unchanged,

    /// The selection is full; a victim must be chosen or the addition cancelled
    AwaitingReplacement { pending: String, options: Vec<ReplaceOption> },
}

/// Overflow protocol state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverflowState {
    #[default]
    Idle,
    AwaitingReplacement { pending: String },
}

impl OverflowState {
    pub fn pending(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::AwaitingReplacement { pending } => Some(pending),
        }
    }
}
