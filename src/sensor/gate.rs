//! Sensitivity gate over the blockage sensor.

use crate::error::{FeedError, Result, SensorError};
use crate::feed::DetectionHistory;

use super::analog::{AnalogInput, Reading};

/// Compares fresh sensor readings against a sensitivity threshold.
pub struct SensorGate<ADC>
where
    ADC: AnalogInput,
{
    input: ADC,
    sensitivity: u16,
    reads: u32,
}

impl<ADC> SensorGate<ADC>
where
    ADC: AnalogInput,
{
    /// Create a gate with the given threshold on the normalized reading.
    pub fn new(input: ADC, sensitivity: u16) -> Self {
        Self {
            input,
            sensitivity,
            reads: 0,
        }
    }

    /// Threshold on the normalized reading.
    #[inline]
    pub fn sensitivity(&self) -> u16 {
        self.sensitivity
    }

    /// Number of samples taken so far.
    #[inline]
    pub fn reads(&self) -> u32 {
        self.reads
    }

    /// Take one fresh reading.
    pub fn read(&mut self) -> Result<Reading> {
        self.reads = self.reads.wrapping_add(1);
        let raw = self.input.read().map_err(|_| SensorError::ReadFailed)?;
        Ok(Reading::new(raw))
    }

    /// Check that the sensor is not blocked before any motion.
    ///
    /// # Errors
    ///
    /// [`FeedError::SensorFault`] if the rounded normalized reading is at or
    /// below the sensitivity.
    pub fn check_precondition(&mut self) -> Result<Reading> {
        let reading = self.read()?;
        if reading.is_clear(self.sensitivity) {
            Ok(reading)
        } else {
            error!(
                "sensor low before motion: raw={} sensitivity={}",
                reading.raw(),
                self.sensitivity
            );
            Err(FeedError::SensorFault {
                raw: reading.raw(),
                sensitivity: self.sensitivity,
            }
            .into())
        }
    }

    /// Poll the sensor at `step_index`.
    ///
    /// Appends `step_index` to `history` and returns `true` when material is
    /// detected; leaves `history` untouched otherwise.
    pub fn sample(&mut self, step_index: u32, history: &mut DetectionHistory) -> Result<bool> {
        let reading = self.read()?;
        if reading.detects_material(self.sensitivity) {
            history.record(step_index);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Release the analog input.
    pub fn free(self) -> ADC {
        self.input
    }
}
