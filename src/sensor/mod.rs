//! Sensor module for feedscrew.
//!
//! Provides the analog input capability and the sensitivity gate used for
//! precondition checks and per-poll material detection.

mod analog;
mod gate;

pub use analog::{AnalogInput, Reading};
pub use gate::SensorGate;
