//! Feed phases and per-operation run state.

use crate::config::MAX_RETRIES_LIMIT;

use super::history::DetectionHistory;

/// Phase of a feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedPhase {
    /// No operation in flight
    Idle,
    /// Sensor is being checked before any motion
    PreconditionCheck,
    /// Forward steps are being issued and the sensor polled
    Running,
    /// Too many steps since the last detection; motor released
    Stalled,
    /// Reverse-clearing before a resumed run
    Recovering,
    /// All steps of the feed were issued
    Completed,
    /// Sensor fault, exhausted retries, or a hardware error
    Aborted,
}

/// Events that move a feed between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedEvent {
    /// A top-level feed was requested
    Start,
    /// The sensor passed its precondition check
    PreconditionPassed,
    /// A poll boundary found the stall gap reached
    StallDetected,
    /// Recovery was granted an attempt
    RecoveryStarted,
    /// Reverse-clear finished, forward motion resumes
    Resumed,
    /// The last step of the run was issued
    RunFinished,
    /// A fatal condition ended the operation
    Fault,
}

impl FeedPhase {
    /// Whether the motor may be energized in this phase.
    pub fn motor_allowed(&self) -> bool {
        matches!(self, FeedPhase::Running | FeedPhase::Recovering)
    }

    /// Whether the operation has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedPhase::Idle | FeedPhase::Completed | FeedPhase::Aborted)
    }

    /// Process an event and return the next phase.
    ///
    /// Events that make no sense in the current phase leave it unchanged.
    pub fn transition(self, event: FeedEvent) -> Self {
        use FeedEvent::*;
        use FeedPhase::*;

        match (self, event) {
            (Idle | Completed | Aborted, Start) => PreconditionCheck,
            (PreconditionCheck, PreconditionPassed) => Running,
            (Running, StallDetected) => Stalled,
            (Stalled, RecoveryStarted) => Recovering,
            (Recovering, Resumed) => Running,
            (Running, RunFinished) => Completed,
            (PreconditionCheck | Running | Stalled | Recovering, Fault) => Aborted,
            (phase, _) => phase,
        }
    }
}

/// One recovery attempt, as logged by the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecoveryRecord {
    /// Attempt number after the increment (2 for the first recovery).
    pub attempt: u8,
    /// Feed step index at which the stall was detected.
    pub stalled_at: u32,
    /// Forward steps granted to the resumed run.
    pub resume_steps: u32,
}

/// Mutable state of exactly one in-flight feed operation.
#[derive(Debug, Clone)]
pub struct RunState {
    attempt_count: u8,
    history: DetectionHistory,
    recoveries: heapless::Vec<RecoveryRecord, { MAX_RETRIES_LIMIT as usize }>,
    forward_steps: u32,
    reverse_steps: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Fresh state: attempt 1, history `[0]`.
    pub fn new() -> Self {
        Self {
            attempt_count: 1,
            history: DetectionHistory::new(),
            recoveries: heapless::Vec::new(),
            forward_steps: 0,
            reverse_steps: 0,
        }
    }

    /// Reset for a new top-level feed.
    pub fn reset(&mut self) {
        self.attempt_count = 1;
        self.history.reset();
        self.recoveries.clear();
        self.forward_steps = 0;
        self.reverse_steps = 0;
    }

    /// Current attempt number, starting at 1.
    #[inline]
    pub fn attempt_count(&self) -> u8 {
        self.attempt_count
    }

    /// Detection history of this operation.
    #[inline]
    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    /// Mutable detection history.
    #[inline]
    pub fn history_mut(&mut self) -> &mut DetectionHistory {
        &mut self.history
    }

    /// Recovery attempts made so far.
    #[inline]
    pub fn recoveries(&self) -> &[RecoveryRecord] {
        &self.recoveries
    }

    /// Forward steps issued by this operation.
    #[inline]
    pub fn forward_steps(&self) -> u32 {
        self.forward_steps
    }

    /// Reverse-clear steps issued by this operation.
    #[inline]
    pub fn reverse_steps(&self) -> u32 {
        self.reverse_steps
    }

    pub(crate) fn count_forward(&mut self) {
        self.forward_steps = self.forward_steps.saturating_add(1);
    }

    pub(crate) fn count_reverse(&mut self) {
        self.reverse_steps = self.reverse_steps.saturating_add(1);
    }

    /// Consume one attempt and log it. Returns the new attempt number.
    pub(crate) fn begin_recovery(&mut self, stalled_at: u32, resume_steps: u32) -> u8 {
        self.attempt_count = self.attempt_count.saturating_add(1);
        // Capacity equals the largest valid retry budget.
        let _ = self.recoveries.push(RecoveryRecord {
            attempt: self.attempt_count,
            stalled_at,
            resume_steps,
        });
        self.attempt_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let phase = FeedPhase::Idle
            .transition(FeedEvent::Start)
            .transition(FeedEvent::PreconditionPassed);
        assert_eq!(phase, FeedPhase::Running);
        assert!(phase.motor_allowed());

        let phase = phase.transition(FeedEvent::RunFinished);
        assert_eq!(phase, FeedPhase::Completed);
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_recovery_cycle() {
        let phase = FeedPhase::Running
            .transition(FeedEvent::StallDetected)
            .transition(FeedEvent::RecoveryStarted)
            .transition(FeedEvent::Resumed);
        assert_eq!(phase, FeedPhase::Running);

        assert_eq!(
            FeedPhase::Stalled.transition(FeedEvent::Fault),
            FeedPhase::Aborted
        );
    }

    #[test]
    fn test_invalid_events_ignored() {
        assert_eq!(FeedPhase::Idle.transition(FeedEvent::StallDetected), FeedPhase::Idle);
        assert_eq!(FeedPhase::Completed.transition(FeedEvent::Fault), FeedPhase::Completed);
        assert_eq!(FeedPhase::Running.transition(FeedEvent::Start), FeedPhase::Running);
    }

    #[test]
    fn test_run_state_reset() {
        let mut state = RunState::new();
        state.history_mut().record(50);
        state.count_forward();
        assert_eq!(state.begin_recovery(2000, 13_500), 2);
        assert_eq!(state.recoveries().len(), 1);

        state.reset();
        assert_eq!(state.attempt_count(), 1);
        assert_eq!(state.history().as_slice(), &[0]);
        assert!(state.recoveries().is_empty());
        assert_eq!(state.forward_steps(), 0);
    }
}
