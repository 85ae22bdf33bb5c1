//! Feed controller: bounded forward run with stall detection and recovery.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{validate_feeder, FeedConfig};
use crate::error::Result;
use crate::motor::{Direction, StepPulser};
use crate::sensor::{AnalogInput, SensorGate};

use super::recovery::{RecoveryProtocol, Segment};
use super::state::{FeedEvent, FeedPhase, RunState};

/// Summary of a completed feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedReport {
    /// Forward steps issued, across all segments.
    pub forward_steps: u32,
    /// Reverse-clear steps issued.
    pub reverse_steps: u32,
    /// Final attempt count (1 if no recovery was needed).
    pub attempts: u8,
    /// Entries in the detection history, sentinel included.
    pub detections: usize,
}

enum SegmentEnd {
    Finished,
    Stalled { at: u32 },
}

/// Orchestrates a feed over a step pulser and a sensor gate.
///
/// Owns the [`RunState`] of the operation in flight; the state stays readable
/// after `run_feed` returns.
pub struct FeedController<DIR, PULSE, EN, DELAY, ADC>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
    ADC: AnalogInput,
{
    pulser: StepPulser<DIR, PULSE, EN, DELAY>,
    gate: SensorGate<ADC>,
    recovery: RecoveryProtocol,
    config: FeedConfig,
    state: RunState,
    phase: FeedPhase,
}

impl<DIR, PULSE, EN, DELAY, ADC> FeedController<DIR, PULSE, EN, DELAY, ADC>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
    ADC: AnalogInput,
{
    /// Create a controller after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation, e.g. a zero
    /// `watch_interval`.
    pub fn new(
        pulser: StepPulser<DIR, PULSE, EN, DELAY>,
        gate: SensorGate<ADC>,
        config: FeedConfig,
    ) -> Result<Self> {
        validate_feeder(&config)?;
        Ok(Self {
            pulser,
            gate,
            recovery: RecoveryProtocol::from_config(&config),
            config,
            state: RunState::new(),
            phase: FeedPhase::Idle,
        })
    }

    /// Get the feeder name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name.as_str()
    }

    /// Get the feeder configuration.
    #[inline]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    /// State of the current or most recent operation.
    #[inline]
    pub fn run_state(&self) -> &RunState {
        &self.state
    }

    /// Whether the motor was last set enabled.
    #[inline]
    pub fn is_motor_enabled(&self) -> bool {
        self.pulser.is_enabled()
    }

    /// The step pulser.
    #[inline]
    pub fn pulser(&self) -> &StepPulser<DIR, PULSE, EN, DELAY> {
        &self.pulser
    }

    /// The sensor gate.
    #[inline]
    pub fn gate(&self) -> &SensorGate<ADC> {
        &self.gate
    }

    /// Run one complete feed.
    ///
    /// Resets the run state, checks the sensor, then issues `feed_length`
    /// forward steps, polling every `watch_interval` steps. A stall hands over
    /// to the recovery protocol, whose resumed runs complete the feed.
    ///
    /// The motor is left disabled on every return path.
    ///
    /// # Errors
    ///
    /// - [`FeedError::SensorFault`](crate::error::FeedError::SensorFault) if
    ///   the sensor is blocked before motion
    /// - [`FeedError::RetryBudgetExhausted`](crate::error::FeedError::RetryBudgetExhausted)
    ///   if jams persist through `max_retries` attempts
    /// - motor or sensor hardware errors
    pub fn run_feed(&mut self) -> Result<FeedReport> {
        self.state.reset();
        self.phase = FeedPhase::Idle;
        self.advance(FeedEvent::Start);

        let result = match self.feed() {
            Ok(report) => Ok(report),
            Err(e) => {
                // Best effort: a pin error here must not mask the first failure
                let _ = self.pulser.set_enabled(false);
                self.advance(FeedEvent::Fault);
                warn!(
                    "feed aborted after {} forward steps: {}",
                    self.state.forward_steps(),
                    e
                );
                Err(e)
            }
        };
        debug_assert!(self.phase.is_terminal());
        result
    }

    fn feed(&mut self) -> Result<FeedReport> {
        self.pulser.set_enabled(false)?;
        self.gate.check_precondition()?;
        self.advance(FeedEvent::PreconditionPassed);
        info!("feed start: {} steps", self.config.feed_length);

        let mut segment = Segment::full(self.config.feed_length);
        loop {
            match self.run_segment(segment)? {
                SegmentEnd::Finished => break,
                SegmentEnd::Stalled { at } => {
                    self.pulser.set_enabled(false)?;
                    self.advance(FeedEvent::StallDetected);
                    warn!(
                        "stall at step {}: last detection at {}",
                        at,
                        self.state.history().last()
                    );

                    self.advance(FeedEvent::RecoveryStarted);
                    segment = self
                        .recovery
                        .unjam(at, &mut self.state, &mut self.pulser, &mut self.gate)?;
                    self.advance(FeedEvent::Resumed);
                    info!("running remaining {} steps", segment.length);
                }
            }
        }

        self.pulser.settle(self.config.settle);
        self.pulser.set_enabled(false)?;
        self.advance(FeedEvent::RunFinished);

        let report = FeedReport {
            forward_steps: self.state.forward_steps(),
            reverse_steps: self.state.reverse_steps(),
            attempts: self.state.attempt_count(),
            detections: self.state.history().len(),
        };
        info!(
            "feed complete: {} forward steps, {} attempts",
            report.forward_steps,
            report.attempts
        );
        Ok(report)
    }

    fn run_segment(&mut self, segment: Segment) -> Result<SegmentEnd> {
        debug_assert!(self.phase.motor_allowed());
        self.pulser.set_enabled(true)?;

        for i in 0..segment.length {
            self.pulser.step(Direction::Forward)?;
            self.state.count_forward();

            if self.config.is_poll_boundary(i) {
                let index = segment.index(i);
                self.gate.sample(index, self.state.history_mut())?;
                if segment.gap_to(index, self.state.history()) >= self.config.max_empty_steps {
                    return Ok(SegmentEnd::Stalled { at: index });
                }
            }
        }

        Ok(SegmentEnd::Finished)
    }

    fn advance(&mut self, event: FeedEvent) {
        let next = self.phase.transition(event);
        debug!("phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Release the pulser and sensor gate.
    pub fn free(self) -> (StepPulser<DIR, PULSE, EN, DELAY>, SensorGate<ADC>) {
        (self.pulser, self.gate)
    }
}
