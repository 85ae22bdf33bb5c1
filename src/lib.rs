//! # feedscrew
//!
//! Jam-detecting feed screw control with embedded-hal 1.0 support.
//!
//! A stepper motor advances a feed screw while an analog blockage sensor
//! confirms material is moving. When the sensor stays silent for too many
//! steps the feed is judged jammed: the screw is reversed a fixed distance and
//! the remaining steps are resumed, up to a bounded number of attempts.
//!
//! ## Features
//!
//! - **embedded-hal 1.0**: Uses `OutputPin` for DIR/STEP/ENA, `DelayNs` for timing
//! - **no_std compatible**: Core library works without standard library
//! - **Bounded recovery**: Reverse-clear and resume, never more than `max_retries` attempts
//! - **Configuration-driven**: Define feeders in TOML files
//! - **Safe exits**: The motor is released on every return path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedscrew::{FeederBuilder, SystemConfig};
//!
//! let config: SystemConfig = feedscrew::load_config("feeder.toml")?;
//!
//! let mut feeder = FeederBuilder::new()
//!     .from_config(&config, "hopper")?
//!     .dir_pin(dir_pin)
//!     .pulse_pin(pulse_pin)
//!     .enable_pin(enable_pin)
//!     .delay(delay)
//!     .sensor(adc)
//!     .build()?;
//!
//! match feeder.run_feed() {
//!     Ok(report) => { /* fed */ }
//!     Err(e) => std::process::exit(e.exit_code()),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible to the modules below
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod feed;
pub mod motor;
pub mod sensor;

// Re-exports for ergonomic API
pub use config::{validate_config, validate_feeder, FeedConfig, HistoryPolicy, SystemConfig};
pub use error::{Error, FeedError, Result};
pub use feed::{FeedController, FeedPhase, FeedReport, FeederBuilder, RunState};
pub use motor::{Direction, StepPulser};
pub use sensor::{AnalogInput, Reading, SensorGate};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microseconds, Milliseconds};
