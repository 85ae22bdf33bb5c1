//! Configuration module for feedscrew.
//!
//! Provides types for loading and validating feeder configurations from TOML
//! files (with `std` feature) or pre-parsed data.

mod feed;
#[cfg(feature = "std")]
mod loader;
mod system;
pub mod units;
mod validation;

pub use feed::{FeedConfig, HistoryPolicy};
pub use system::SystemConfig;
pub use validation::{validate_config, validate_feeder, MAX_RETRIES_LIMIT};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

pub use units::{Microseconds, Milliseconds};
