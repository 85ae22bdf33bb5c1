//! Detection history: step indices at which the sensor saw material.

/// Number of detections stored verbatim.
///
/// A nominal 15500-step feed polled every 50 steps records at most 311 entries.
pub const HISTORY_CAPACITY: usize = 1024;

/// Ordered, append-only record of detection step indices.
///
/// Starts with a sentinel `0`. Once the buffer is full, further detections
/// still move [`last`](Self::last) and are counted, so stall detection keeps
/// working on arbitrarily long runs.
#[derive(Debug, Clone)]
pub struct DetectionHistory {
    entries: heapless::Vec<u32, HISTORY_CAPACITY>,
    last: u32,
    overflowed: u32,
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionHistory {
    /// Fresh history holding only the sentinel `0`.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Fresh history whose sentinel is `origin`.
    pub fn starting_at(origin: u32) -> Self {
        let mut entries = heapless::Vec::new();
        // Capacity is non-zero, first push cannot fail.
        let _ = entries.push(origin);
        Self {
            entries,
            last: origin,
            overflowed: 0,
        }
    }

    /// Reset to the sentinel `0`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reset to a single sentinel at `origin`.
    pub fn reset_to(&mut self, origin: u32) {
        *self = Self::starting_at(origin);
    }

    /// Record a detection at `step_index`.
    ///
    /// Indices must arrive in non-decreasing order. Release builds clamp a
    /// stray lower index up to the last entry.
    pub fn record(&mut self, step_index: u32) {
        debug_assert!(
            step_index >= self.last,
            "detection at {} recorded after {}",
            step_index,
            self.last
        );
        let index = step_index.max(self.last);
        if self.entries.push(index).is_err() {
            self.overflowed = self.overflowed.saturating_add(1);
        }
        self.last = index;
    }

    /// Most recent detection (or the sentinel).
    #[inline]
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Steps elapsed between the last detection and `step_index`.
    #[inline]
    pub fn gap_to(&self, step_index: u32) -> u32 {
        step_index.saturating_sub(self.last)
    }

    /// Stored entries, sentinel first.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    /// Total number of entries, including those past capacity.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len() + self.overflowed as usize
    }

    /// Never true: the sentinel is always present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Detections dropped from storage after the buffer filled.
    #[inline]
    pub fn overflowed(&self) -> u32 {
        self.overflowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_sentinel() {
        let history = DetectionHistory::new();
        assert_eq!(history.as_slice(), &[0]);
        assert_eq!(history.last(), 0);
        assert_eq!(history.gap_to(2000), 2000);
    }

    #[test]
    fn test_record_and_reset() {
        let mut history = DetectionHistory::new();
        history.record(50);
        history.record(100);
        assert_eq!(history.as_slice(), &[0, 50, 100]);
        assert_eq!(history.gap_to(150), 50);

        history.reset();
        assert_eq!(history.as_slice(), &[0]);

        history.reset_to(2000);
        assert_eq!(history.as_slice(), &[2000]);
        assert_eq!(history.gap_to(1000), 0);
    }

    #[test]
    fn test_repeated_index_allowed() {
        let mut history = DetectionHistory::new();
        history.record(0);
        history.record(500);
        history.record(500);
        assert_eq!(history.as_slice(), &[0, 0, 500, 500]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "recorded after")]
    fn test_out_of_order_index_panics_in_debug() {
        let mut history = DetectionHistory::new();
        history.record(500);
        history.record(100);
    }

    #[test]
    fn test_overflow_keeps_last() {
        let mut history = DetectionHistory::new();
        for i in 1..=(HISTORY_CAPACITY as u32 + 10) {
            history.record(i);
        }
        assert_eq!(history.as_slice().len(), HISTORY_CAPACITY);
        assert_eq!(history.overflowed(), 11);
        assert_eq!(history.len(), HISTORY_CAPACITY + 11);
        assert_eq!(history.last(), HISTORY_CAPACITY as u32 + 10);
    }
}
