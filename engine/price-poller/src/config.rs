//! Configuration for the price poller

use crate::{DEFAULT_BUFFER_CAPACITY, DEFAULT_EVENT_CAPACITY, DEFAULT_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Configuration for the price poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Time between ticks in milliseconds
    pub interval_ms: u64,

    /// Maximum number of samples kept; older samples are dropped from the front
    pub buffer_capacity: usize,

    /// What to do when a fetch outlasts the interval
    pub overlap: OverlapPolicy,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

/// Scheduling when a tick is still fetching at the next deadline
///
/// Ticks never run concurrently under either policy; samples are always
/// applied in tick order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop the missed deadlines and stay on the original cadence
    #[default]
    Skip,
    /// Run the late tick right away, then restart the cadence from there
    Delay,
}

impl OverlapPolicy {
    pub(crate) fn missed_tick_behavior(self) -> MissedTickBehavior {
        match self {
            OverlapPolicy::Skip => MissedTickBehavior::Skip,
            OverlapPolicy::Delay => MissedTickBehavior::Delay,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            overlap: OverlapPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl PollerConfig {
    /// Get the polling interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("interval_ms must be greater than 0".to_string());
        }

        if self.buffer_capacity == 0 {
            return Err("buffer_capacity must be greater than 0".to_string());
        }

        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}
