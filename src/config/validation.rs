//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{FeedConfig, SystemConfig};

/// Upper bound on `max_retries`; also the capacity of the recovery log.
pub const MAX_RETRIES_LIMIT: u8 = 16;

/// Validate a system configuration.
///
/// Every feeder must pass [`validate_feeder`].
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_name, feeder) in config.feeders.iter() {
        validate_feeder(feeder)?;
    }

    Ok(())
}

/// Validate a single feeder configuration.
///
/// Checks:
/// - `watch_interval` is non-zero (it is used as a modulus)
/// - `feed_length` and `max_empty_steps` are non-zero
/// - `step_delay_us` is non-zero
/// - `max_retries` is within `1..=MAX_RETRIES_LIMIT`
pub fn validate_feeder(config: &FeedConfig) -> Result<()> {
    if config.watch_interval == 0 {
        return Err(Error::Config(ConfigError::InvalidWatchInterval(
            config.watch_interval,
        )));
    }

    if config.feed_length == 0 {
        return Err(Error::Config(ConfigError::InvalidFeedLength(config.feed_length)));
    }

    if config.max_empty_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxEmptySteps(
            config.max_empty_steps,
        )));
    }

    if config.step_delay.is_zero() {
        return Err(Error::Config(ConfigError::InvalidStepDelay(config.step_delay.0)));
    }

    if config.max_retries == 0 || config.max_retries > MAX_RETRIES_LIMIT {
        return Err(Error::Config(ConfigError::InvalidMaxRetries(config.max_retries)));
    }

    Ok(())
}
