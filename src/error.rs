//! Error types for feedscrew.
//!
//! Provides unified error handling across configuration, motor control, sensing,
//! and the feed operation itself.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all feedscrew operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor line operation error
    Motor(MotorError),
    /// Sensor read error
    Sensor(SensorError),
    /// Fatal feed outcome (sensor fault or exhausted retries)
    Feed(FeedError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Feeder name not found in configuration
    FeederNotFound(heapless::String<32>),
    /// Poll interval must be at least one step
    InvalidWatchInterval(u32),
    /// Feed length must be at least one step
    InvalidFeedLength(u32),
    /// Stall threshold must be at least one step
    InvalidMaxEmptySteps(u32),
    /// Step delay must be non-zero
    InvalidStepDelay(u32),
    /// Retry budget out of range
    InvalidMaxRetries(u8),
    /// A hardware component was not supplied to the builder
    MissingComponent(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor line errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Direction, pulse or enable line could not be driven
    PinError,
}

/// Sensor errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The analog input returned an error
    ReadFailed,
}

/// Fatal outcomes of a feed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedError {
    /// Sensor reads blocked before motion (startup or before a reverse-clear)
    SensorFault {
        /// Raw reading that failed the check
        raw: u16,
        /// Configured threshold on the normalized reading
        sensitivity: u16,
    },
    /// Jam recovery was attempted `max_retries` times without completing
    RetryBudgetExhausted {
        /// Attempt count when the budget check failed
        attempts: u8,
        /// Feed step index of the stall that could not be recovered
        stalled_at: u32,
    },
}

impl Error {
    /// Process exit status for a caller that terminates on this error.
    ///
    /// Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Feed(FeedError::SensorFault { .. }) => 2,
            Error::Feed(FeedError::RetryBudgetExhausted { .. }) => 3,
            _ => 1,
        }
    }

    /// Whether this is one of the two fatal feed conditions.
    pub fn is_feed_fault(&self) -> bool {
        matches!(self, Error::Feed(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Sensor(e) => write!(f, "Sensor error: {}", e),
            Error::Feed(e) => write!(f, "Feed aborted: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::FeederNotFound(name) => write!(f, "Feeder '{}' not found", name),
            ConfigError::InvalidWatchInterval(v) => {
                write!(f, "Invalid watch interval: {}. Must be > 0", v)
            }
            ConfigError::InvalidFeedLength(v) => write!(f, "Invalid feed length: {}. Must be > 0", v),
            ConfigError::InvalidMaxEmptySteps(v) => {
                write!(f, "Invalid max empty steps: {}. Must be > 0", v)
            }
            ConfigError::InvalidStepDelay(v) => write!(f, "Invalid step delay: {} us. Must be > 0", v),
            ConfigError::InvalidMaxRetries(v) => {
                write!(f, "Invalid max retries: {}. Must be 1-{}", v, crate::config::MAX_RETRIES_LIMIT)
            }
            ConfigError::MissingComponent(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::ReadFailed => write!(f, "analog read failed"),
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::SensorFault { raw, sensitivity } => write!(
                f,
                "sensor value is low before motion (raw {}, sensitivity {}). \
                 Adjust sensitivity or check sensor for blockage",
                raw, sensitivity
            ),
            FeedError::RetryBudgetExhausted { attempts, stalled_at } => write!(
                f,
                "jam at step {} not cleared after {} attempts",
                stalled_at, attempts
            ),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Error::Sensor(e)
    }
}

impl From<FeedError> for Error {
    fn from(e: FeedError) -> Self {
        Error::Feed(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for SensorError {}

#[cfg(feature = "std")]
impl std::error::Error for FeedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_non_zero() {
        let fault = Error::from(FeedError::SensorFault { raw: 40, sensitivity: 50 });
        let exhausted = Error::from(FeedError::RetryBudgetExhausted {
            attempts: 5,
            stalled_at: 2000,
        });
        let pin = Error::from(MotorError::PinError);

        assert_eq!(fault.exit_code(), 2);
        assert_eq!(exhausted.exit_code(), 3);
        assert_eq!(pin.exit_code(), 1);
        assert!(fault.is_feed_fault());
        assert!(!pin.is_feed_fault());
    }
}
