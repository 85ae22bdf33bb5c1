//! Motor module for feedscrew.
//!
//! Provides the step pulser that drives the direction, pulse and enable lines.

mod direction;
mod pulser;

pub use direction::Direction;
pub use pulser::StepPulser;
