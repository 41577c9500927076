//! # Selection Manager
//!
//! Keeps the user's pinned coins: an ordered list of at most five unique coin ids
//! that is written through to persistent storage on every change.
//!
//! Adding to a full selection does not fail and does not silently evict. It opens
//! a replacement decision instead:
//!
//! ```text
//!   Idle ──request_add(full)──▶ AwaitingReplacement{pending}
//!    ▲                               │
//!    └──── confirm_replacement(victim) / cancel_replacement
//! ```
//!
//! The [`rules`] module holds the same logic as pure functions over id lists.

pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod rules;
pub mod symbols;

#[cfg(test)]
mod tests;

pub use config::SelectionConfig;
pub use error::{Result, SelectionError};
pub use events::{OverflowState, SelectionChange, SelectionEvent};
pub use manager::SelectionManager;
pub use rules::ReplaceOption;
pub use symbols::derive_symbols;

/// Maximum number of selected coins
pub const DEFAULT_MAX_SELECTED: usize = 5;
