//! Builder pattern for FeedController.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{validate_feeder, FeedConfig, SystemConfig};
use crate::error::{ConfigError, Error, Result};
use crate::motor::StepPulser;
use crate::sensor::{AnalogInput, SensorGate};

use super::controller::FeedController;

/// Builder for creating FeedController instances.
pub struct FeederBuilder<DIR, PULSE, EN, DELAY, ADC>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
    ADC: AnalogInput,
{
    dir_pin: Option<DIR>,
    pulse_pin: Option<PULSE>,
    enable_pin: Option<EN>,
    delay: Option<DELAY>,
    sensor: Option<ADC>,
    config: FeedConfig,
}

impl<DIR, PULSE, EN, DELAY, ADC> Default for FeederBuilder<DIR, PULSE, EN, DELAY, ADC>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
    ADC: AnalogInput,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<DIR, PULSE, EN, DELAY, ADC> FeederBuilder<DIR, PULSE, EN, DELAY, ADC>
where
    DIR: OutputPin,
    PULSE: OutputPin,
    EN: OutputPin,
    DELAY: DelayNs,
    ADC: AnalogInput,
{
    /// Create a new builder with the default feeder configuration.
    pub fn new() -> Self {
        Self {
            dir_pin: None,
            pulse_pin: None,
            enable_pin: None,
            delay: None,
            sensor: None,
            config: FeedConfig::default(),
        }
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the STEP (pulse) pin.
    pub fn pulse_pin(mut self, pin: PULSE) -> Self {
        self.pulse_pin = Some(pin);
        self
    }

    /// Set the ENA pin.
    pub fn enable_pin(mut self, pin: EN) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the blockage sensor input.
    pub fn sensor(mut self, sensor: ADC) -> Self {
        self.sensor = Some(sensor);
        self
    }

    /// Set the feeder name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = heapless::String::try_from(name).unwrap_or_default();
        self
    }

    /// Replace the whole feeder configuration.
    pub fn from_feed_config(mut self, config: &FeedConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Configure from SystemConfig by feeder name.
    pub fn from_config(self, config: &SystemConfig, feeder_name: &str) -> Result<Self> {
        let feed_config = config.feeder(feeder_name).ok_or_else(|| {
            Error::Config(ConfigError::FeederNotFound(
                heapless::String::try_from(feeder_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_feed_config(feed_config))
    }

    /// Adjust individual configuration fields in place.
    pub fn configure(mut self, f: impl FnOnce(&mut FeedConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Build the FeedController.
    ///
    /// Validates the configuration and releases the motor so it is never left
    /// energized from power-up.
    ///
    /// # Errors
    ///
    /// Returns an error if a component is missing, the configuration is invalid,
    /// or the enable line cannot be driven.
    pub fn build(self) -> Result<FeedController<DIR, PULSE, EN, DELAY, ADC>> {
        validate_feeder(&self.config)?;

        let dir_pin = self
            .dir_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("dir_pin")))?;
        let pulse_pin = self
            .pulse_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("pulse_pin")))?;
        let enable_pin = self
            .enable_pin
            .ok_or(Error::Config(ConfigError::MissingComponent("enable_pin")))?;
        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::MissingComponent("delay")))?;
        let sensor = self
            .sensor
            .ok_or(Error::Config(ConfigError::MissingComponent("sensor")))?;

        let mut pulser = StepPulser::new(
            dir_pin,
            pulse_pin,
            enable_pin,
            delay,
            self.config.step_delay,
            self.config.invert_direction,
            self.config.enable_active_low,
        );
        let gate = SensorGate::new(sensor, self.config.sensitivity);

        pulser.set_enabled(false)?;

        FeedController::new(pulser, gate, self.config)
    }
}
