//! Feeder configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{Microseconds, Milliseconds};

/// What happens to the detection history when a resumed run starts.
///
/// Either way a resumed run measures its stall gap from the later of the last
/// detection and its own first step, so it always gets a full
/// `max_empty_steps` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Keep the history of the whole operation.
    #[default]
    Carry,
    /// Restart the history with a single entry at the resume point.
    ResetOnResume,
}

/// Complete feeder configuration.
///
/// Every field except `name` falls back to the values the mechanism was tuned
/// with, so a TOML table only needs to list what differs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Pulse half-period: pulse is held high, then low, for this long.
    #[serde(rename = "step_delay_us")]
    pub step_delay: Microseconds,

    /// Steps between sensor polls.
    pub watch_interval: u32,

    /// Total steps of a nominal feed.
    pub feed_length: u32,

    /// Stall threshold: steps allowed since the last detection.
    pub max_empty_steps: u32,

    /// Threshold on the normalized sensor reading (raw / 2).
    pub sensitivity: u16,

    /// Attempt budget, counting the initial run.
    pub max_retries: u8,

    /// Fixed number of reverse steps taken to clear a jam.
    pub reverse_clear_steps: u32,

    /// Wait after a completed run before the motor is released.
    #[serde(rename = "settle_ms")]
    pub settle: Milliseconds,

    /// History handling across recovery attempts.
    pub history_policy: HistoryPolicy,

    /// Invert direction pin logic (forward drives the line low).
    pub invert_direction: bool,

    /// Driver enable input is active low.
    pub enable_active_low: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            step_delay: Microseconds(350),
            watch_interval: 50,
            feed_length: 15_500,
            max_empty_steps: 2_000,
            sensitivity: 50,
            max_retries: 5,
            reverse_clear_steps: 4_000,
            settle: Milliseconds(50),
            history_policy: HistoryPolicy::Carry,
            invert_direction: false,
            enable_active_low: true,
        }
    }
}

impl FeedConfig {
    /// Whether `step_index` is a poll boundary.
    ///
    /// Assumes a validated config (`watch_interval > 0`).
    #[inline]
    pub fn is_poll_boundary(&self, step_index: u32) -> bool {
        step_index % self.watch_interval == 0
    }
}
