//! Analog input capability and reading normalization.

/// Source of raw blockage-sensor readings.
///
/// embedded-hal 1.0 has no ADC trait, so the feeder takes this one. Each call
/// must take a fresh sample.
pub trait AnalogInput {
    /// Error returned by the underlying converter.
    type Error: core::fmt::Debug;

    /// Take one raw reading.
    fn read(&mut self) -> Result<u16, Self::Error>;
}

/// Any closure returning a raw value is an infallible analog input.
impl<F> AnalogInput for F
where
    F: FnMut() -> u16,
{
    type Error = core::convert::Infallible;

    fn read(&mut self) -> Result<u16, Self::Error> {
        Ok(self())
    }
}

/// One raw sensor reading.
///
/// Thresholds are applied to the normalized value, which is half the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    raw: u16,
}

impl Reading {
    /// Wrap a raw reading.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// Raw converter value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// Normalized value (raw / 2).
    #[inline]
    pub fn normalized(self) -> f32 {
        f32::from(self.raw) / 2.0
    }

    /// Normalized value rounded half-to-even.
    pub const fn normalized_rounded(self) -> u16 {
        let half = self.raw / 2;
        if self.raw % 2 == 1 && half % 2 == 1 {
            half + 1
        } else {
            half
        }
    }

    /// Material is in front of the sensor: exact normalized value `<= sensitivity`.
    #[inline]
    pub const fn detects_material(self, sensitivity: u16) -> bool {
        (self.raw as u32) <= (sensitivity as u32) * 2
    }

    /// Sensor sees past the threshold before motion: rounded normalized value
    /// `> sensitivity`.
    #[inline]
    pub const fn is_clear(self, sensitivity: u16) -> bool {
        self.normalized_rounded() > sensitivity
    }
}
