//! Feed screw rotation direction.

/// Direction of travel of the feed screw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Moves material towards the outlet.
    Forward,
    /// Backs the screw off to clear a jam.
    Reverse,
}

impl Direction {
    /// Level of the direction line, before any inversion.
    #[inline]
    pub fn line_high(self) -> bool {
        matches!(self, Direction::Forward)
    }
}
