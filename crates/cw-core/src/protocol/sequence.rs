//! Transmit sequence counter.
//!
//! # What is the sequence number for? (for beginners)
//!
//! The relay transport is plain UDP: datagrams get lost, and this client
//! deliberately sends every keying packet five times to compensate.  Every
//! receiver is therefore required to deduplicate, and the 32-bit sequence
//! number in each data packet is the key it deduplicates on.  The five
//! redundant copies of one keying event all carry the *same* sequence value;
//! distinct events carry strictly increasing values.
//!
//! Unlike a per-connection TCP-style counter this one is *pre-increment*:
//! the counter is bumped first and the new value goes on the wire, so the
//! first packet of a session carries sequence 1, never 0.  Existing servers
//! were observed to treat 0 as "no sequence yet".

/// A monotonically increasing counter for outbound data packets.
///
/// Plain (non-atomic) by design: the counter lives inside the session
/// record, which the protocol requires callers to serialise externally, so
/// there is nothing to synchronise.  Wraps at `u32::MAX` without panicking.
///
/// # Examples
///
/// ```rust
/// use cw_core::protocol::SequenceCounter;
///
/// let mut counter = SequenceCounter::new();
/// assert_eq!(counter.bump(), 1);
/// assert_eq!(counter.bump(), 2);
/// assert_eq!(counter.current(), 2);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    value: u32,
}

impl SequenceCounter {
    /// Creates a counter whose first [`bump`](Self::bump) returns 1.
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Increments the counter and returns the new value.
    pub fn bump(&mut self) -> u32 {
        self.value = self.value.wrapping_add(1);
        self.value
    }

    /// Returns the most recently issued value without incrementing.
    pub fn current(&self) -> u32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_bump_returns_one() {
        // Arrange
        let mut counter = SequenceCounter::new();

        // Act / Assert – pre-increment semantics: 0 never goes on the wire
        assert_eq!(counter.bump(), 1);
    }

    #[test]
    fn test_bump_is_strictly_monotonic() {
        let mut counter = SequenceCounter::new();

        let values: Vec<u32> = (0..100).map(|_| counter.bump()).collect();

        for window in values.windows(2) {
            assert!(window[1] > window[0], "values must be strictly increasing");
        }
    }

    #[test]
    fn test_current_does_not_increment() {
        let mut counter = SequenceCounter::new();
        counter.bump();

        assert_eq!(counter.current(), 1);
        assert_eq!(counter.current(), 1);
        assert_eq!(counter.bump(), 2);
    }

    #[test]
    fn test_wraps_at_u32_max() {
        let mut counter = SequenceCounter { value: u32::MAX };

        assert_eq!(counter.bump(), 0, "counter must wrap without panicking");
        assert_eq!(counter.bump(), 1);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(SequenceCounter::default(), SequenceCounter::new());
    }
}
