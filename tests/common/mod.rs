//! Simulated feeder hardware shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use feedscrew::{AnalogInput, FeedConfig, FeedController, FeederBuilder};

/// Everything the simulated lines and sensor have observed.
#[derive(Debug, Default)]
pub struct RigState {
    pub dir_high: bool,
    pub enable_high: bool,
    pub forward_pulses: u32,
    pub reverse_pulses: u32,
    pub pulses_while_disabled: u32,
    pub enable_writes: u32,
    pub reads: u32,
    pub delay_ns: u64,
}

impl RigState {
    /// Active-low enable: the driver is energized while the line is low.
    pub fn motor_enabled(&self) -> bool {
        self.enable_writes > 0 && !self.enable_high
    }

    pub fn total_pulses(&self) -> u32 {
        self.forward_pulses + self.reverse_pulses + self.pulses_while_disabled
    }
}

pub type Shared = Rc<RefCell<RigState>>;

pub struct DirPin(pub Shared);
pub struct PulsePin(pub Shared);
pub struct EnablePin(pub Shared);
pub struct SimDelay(pub Shared);

impl ErrorType for DirPin {
    type Error = Infallible;
}

impl OutputPin for DirPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().dir_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().dir_high = true;
        Ok(())
    }
}

impl ErrorType for PulsePin {
    type Error = Infallible;
}

impl OutputPin for PulsePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut rig = self.0.borrow_mut();
        if !rig.motor_enabled() {
            rig.pulses_while_disabled += 1;
        } else if rig.dir_high {
            rig.forward_pulses += 1;
        } else {
            rig.reverse_pulses += 1;
        }
        Ok(())
    }
}

impl ErrorType for EnablePin {
    type Error = Infallible;
}

impl OutputPin for EnablePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut rig = self.0.borrow_mut();
        rig.enable_high = false;
        rig.enable_writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut rig = self.0.borrow_mut();
        rig.enable_high = true;
        rig.enable_writes += 1;
        Ok(())
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().delay_ns += u64::from(ns);
    }
}

/// Sensor whose raw value is computed from the rig state at read time.
pub struct ScriptedSensor {
    rig: Shared,
    script: Box<dyn FnMut(&RigState) -> u16>,
}

impl AnalogInput for ScriptedSensor {
    type Error = Infallible;

    fn read(&mut self) -> Result<u16, Self::Error> {
        self.rig.borrow_mut().reads += 1;
        let rig = self.rig.borrow();
        Ok((self.script)(&rig))
    }
}

pub type SimFeeder = FeedController<DirPin, PulsePin, EnablePin, SimDelay, ScriptedSensor>;

/// Raw converter value for a normalized reading.
pub fn raw(normalized: u16) -> u16 {
    normalized * 2
}

/// Build a feeder over a fresh rig.
pub fn feeder(
    config: FeedConfig,
    script: impl FnMut(&RigState) -> u16 + 'static,
) -> (Shared, SimFeeder) {
    let rig: Shared = Rc::new(RefCell::new(RigState::default()));
    let sensor = ScriptedSensor {
        rig: rig.clone(),
        script: Box::new(script),
    };

    let feeder = FeederBuilder::new()
        .from_feed_config(&config)
        .dir_pin(DirPin(rig.clone()))
        .pulse_pin(PulsePin(rig.clone()))
        .enable_pin(EnablePin(rig.clone()))
        .delay(SimDelay(rig.clone()))
        .sensor(sensor)
        .build()
        .expect("simulated feeder should build");

    (rig, feeder)
}
