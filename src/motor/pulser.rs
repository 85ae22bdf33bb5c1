//! Step pulse generation over embedded-hal 1.0 pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{Microseconds, Milliseconds};
use crate::error::{MotorError, Result};

use super::direction::Direction;

/// Drives the direction, pulse and enable lines of a step/dir driver.
///
/// Generic over:
/// - `DIR`: direction pin type
/// - `PULSE`: step pulse pin type
/// - `EN`: driver enable pin type
/// - `DELAY`: blocking delay provider
pub struct StepPulser<DIR, PULSE, EN, DELAY>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    /// DIR pin (high = forward unless inverted).
    dir_pin: DIR,

    /// STEP pin (one high/low cycle per micro-step).
    pulse_pin: PULSE,

    /// ENA pin.
    enable_pin: EN,

    /// Delay provider for pulse timing and settle waits.
    delay: DELAY,

    /// Pulse half-period.
    step_delay: Microseconds,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Whether the driver is enabled by pulling ENA low.
    enable_active_low: bool,

    /// Last value written to the enable line.
    enabled: bool,

    /// Last direction written, if any.
    direction: Option<Direction>,

    forward_steps: u32,
    reverse_steps: u32,
}

impl<DIR, PULSE, EN, DELAY> StepPulser<DIR, PULSE, EN, DELAY>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
{
    /// Create a pulser. No lines are touched until the first call.
    pub fn new(
        dir_pin: DIR,
        pulse_pin: PULSE,
        enable_pin: EN,
        delay: DELAY,
        step_delay: Microseconds,
        invert_direction: bool,
        enable_active_low: bool,
    ) -> Self {
        Self {
            dir_pin,
            pulse_pin,
            enable_pin,
            delay,
            step_delay,
            invert_direction,
            enable_active_low,
            enabled: false,
            direction: None,
            forward_steps: 0,
            reverse_steps: 0,
        }
    }

    /// Execute exactly one micro-step in `direction`.
    ///
    /// Sets the direction line, then holds the pulse line high and low for
    /// one step delay each.
    pub fn step(&mut self, direction: Direction) -> Result<()> {
        let dir_high = direction.line_high() != self.invert_direction;
        if dir_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        self.direction = Some(direction);

        self.pulse_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.step_delay.0);
        self.pulse_pin.set_low().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.step_delay.0);

        match direction {
            Direction::Forward => self.forward_steps = self.forward_steps.wrapping_add(1),
            Direction::Reverse => self.reverse_steps = self.reverse_steps.wrapping_add(1),
        }

        Ok(())
    }

    /// Energize or release the driver.
    ///
    /// A released motor free-wheels and ignores pulses.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        let line_high = enabled != self.enable_active_low;
        if line_high {
            self.enable_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.enable_pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        self.enabled = enabled;
        Ok(())
    }

    /// Whether the driver was last set enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Direction of the last step, if any.
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Pulse half-period.
    #[inline]
    pub fn step_delay(&self) -> Microseconds {
        self.step_delay
    }

    /// Steps issued in `direction` since creation.
    #[inline]
    pub fn steps(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Forward => self.forward_steps,
            Direction::Reverse => self.reverse_steps,
        }
    }

    /// Block for `duration` with the lines unchanged.
    pub fn settle(&mut self, duration: Milliseconds) {
        self.delay.delay_ms(duration.0);
    }

    /// Release the pins and delay provider.
    pub fn free(self) -> (DIR, PULSE, EN, DELAY) {
        (self.dir_pin, self.pulse_pin, self.enable_pin, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    const NO_WRITES: [PinTransaction; 0] = [];

    #[test]
    fn test_single_forward_step_line_sequence() {
        let dir = PinMock::new(&[PinTransaction::set(PinState::High)]);
        let pulse = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        // Active-low enable: enable pulls the line low, disable drives it high
        let enable = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);

        let mut pulser = StepPulser::new(
            dir,
            pulse,
            enable,
            NoopDelay::new(),
            Microseconds(350),
            false,
            true,
        );

        pulser.set_enabled(true).unwrap();
        assert!(pulser.is_enabled());
        pulser.step(Direction::Forward).unwrap();
        pulser.set_enabled(false).unwrap();
        assert!(!pulser.is_enabled());
        assert_eq!(pulser.steps(Direction::Forward), 1);
        assert_eq!(pulser.steps(Direction::Reverse), 0);

        let (mut dir, mut pulse, mut enable, _) = pulser.free();
        dir.done();
        pulse.done();
        enable.done();
    }

    #[test]
    fn test_inverted_reverse_step() {
        // Reverse normally drives DIR low; inverted it drives it high
        let dir = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::High),
        ]);
        let pulse = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let enable = PinMock::new(&NO_WRITES);

        let mut pulser = StepPulser::new(
            dir,
            pulse,
            enable,
            NoopDelay::new(),
            Microseconds(350),
            true,
            true,
        );

        pulser.step(Direction::Reverse).unwrap();
        pulser.step(Direction::Reverse).unwrap();
        assert_eq!(pulser.steps(Direction::Reverse), 2);
        assert_eq!(pulser.direction(), Some(Direction::Reverse));

        let (mut dir, mut pulse, mut enable, _) = pulser.free();
        dir.done();
        pulse.done();
        enable.done();
    }

    #[derive(Default)]
    struct TotalDelay {
        ns: u64,
    }

    impl DelayNs for TotalDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.ns += u64::from(ns);
        }
    }

    #[test]
    fn test_step_holds_each_level_for_step_delay() {
        let mut pulser = StepPulser::new(
            PinMock::new(&[PinTransaction::set(PinState::High)]),
            PinMock::new(&[
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
            ]),
            PinMock::new(&NO_WRITES),
            TotalDelay::default(),
            Microseconds(350),
            false,
            true,
        );

        pulser.step(Direction::Forward).unwrap();

        let (mut dir, mut pulse, mut enable, delay) = pulser.free();
        assert_eq!(delay.ns, 700_000);
        dir.done();
        pulse.done();
        enable.done();
    }
}
