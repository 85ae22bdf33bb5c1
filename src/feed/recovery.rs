//! Jam recovery: budget check, reverse-clear, and the resumed run plan.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{FeedConfig, HistoryPolicy};
use crate::error::{FeedError, Result};
use crate::motor::{Direction, StepPulser};
use crate::sensor::{AnalogInput, SensorGate};

use super::history::DetectionHistory;
use super::state::RunState;

/// A contiguous stretch of forward feed.
///
/// Step indices inside a segment are `origin + i` for `i in 0..length`, so the
/// indices recorded across a chain of resumed runs never go backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Feed step index of the segment's first step.
    pub origin: u32,
    /// Forward steps in the segment.
    pub length: u32,
}

impl Segment {
    /// The nominal run from index 0.
    pub fn full(feed_length: u32) -> Self {
        Self {
            origin: 0,
            length: feed_length,
        }
    }

    /// The run that completes a feed after a stall at `stalled_at`.
    pub fn resuming(stalled_at: u32, feed_length: u32) -> Self {
        Self {
            origin: stalled_at,
            length: feed_length.saturating_sub(stalled_at),
        }
    }

    /// Feed step index of poll `i` within the segment.
    #[inline]
    pub fn index(&self, i: u32) -> u32 {
        self.origin.saturating_add(i)
    }

    /// Empty steps at `step_index`, counted from the later of the last
    /// detection and the segment origin.
    ///
    /// Every segment gets a full stall window, whatever history it carries.
    #[inline]
    pub fn gap_to(&self, step_index: u32, history: &DetectionHistory) -> u32 {
        history
            .gap_to(step_index)
            .min(step_index.saturating_sub(self.origin))
    }
}

/// Reverse-clear-then-resume protocol with a global attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryProtocol {
    max_retries: u8,
    reverse_clear_steps: u32,
    feed_length: u32,
    history_policy: HistoryPolicy,
}

impl RecoveryProtocol {
    /// Take the recovery parameters from a feeder configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            reverse_clear_steps: config.reverse_clear_steps,
            feed_length: config.feed_length,
            history_policy: config.history_policy,
        }
    }

    /// Attempt budget, counting the initial run.
    #[inline]
    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    /// Fixed reverse-clear distance.
    #[inline]
    pub fn reverse_clear_steps(&self) -> u32 {
        self.reverse_clear_steps
    }

    /// Recover from a stall detected at feed step `stalled_at`.
    ///
    /// On success the jam has been backed off and the returned segment is the
    /// forward run that completes the feed: `feed_length - stalled_at` steps,
    /// starting at `stalled_at`. The caller runs it with the normal stall logic
    /// and calls `unjam` again if it stalls.
    ///
    /// # Errors
    ///
    /// - [`FeedError::RetryBudgetExhausted`] when `max_retries` attempts are used
    /// - [`FeedError::SensorFault`] when the sensor is blocked before reversing
    pub fn unjam<DIR, PULSE, EN, DELAY, ADC>(
        &self,
        stalled_at: u32,
        state: &mut RunState,
        pulser: &mut StepPulser<DIR, PULSE, EN, DELAY>,
        gate: &mut SensorGate<ADC>,
    ) -> Result<Segment>
    where
        DIR: OutputPin,
        PULSE: OutputPin,
        EN: OutputPin,
        DELAY: DelayNs,
        ADC: AnalogInput,
    {
        if state.attempt_count() >= self.max_retries {
            error!(
                "retry budget exhausted: attempts={} stalled_at={}",
                state.attempt_count(),
                stalled_at
            );
            return Err(FeedError::RetryBudgetExhausted {
                attempts: state.attempt_count(),
                stalled_at,
            }
            .into());
        }

        let resume = Segment::resuming(stalled_at, self.feed_length);
        let attempt = state.begin_recovery(stalled_at, resume.length);
        info!("unjam attempt {} after stall at step {}", attempt, stalled_at);

        self.prime(state, pulser, gate)?;

        if self.history_policy == HistoryPolicy::ResetOnResume {
            state.history_mut().reset_to(stalled_at);
        }

        Ok(resume)
    }

    /// Back the screw off by the fixed reverse-clear distance.
    ///
    /// The sensor must pass its precondition first. The motor is released
    /// afterwards.
    pub fn prime<DIR, PULSE, EN, DELAY, ADC>(
        &self,
        state: &mut RunState,
        pulser: &mut StepPulser<DIR, PULSE, EN, DELAY>,
        gate: &mut SensorGate<ADC>,
    ) -> Result<()>
    where
        DIR: OutputPin,
        PULSE: OutputPin,
        EN: OutputPin,
        DELAY: DelayNs,
        ADC: AnalogInput,
    {
        gate.check_precondition()?;

        pulser.set_enabled(true)?;
        for _ in 0..self.reverse_clear_steps {
            pulser.step(Direction::Reverse)?;
            state.count_reverse();
        }
        pulser.set_enabled(false)?;

        debug!("reverse-clear done: {} steps", self.reverse_clear_steps);
        Ok(())
    }
}
