//! # Range Resolver
//!
//! Turns a seek request into a concrete inclusive block range.
//!
//! The start number is resolved by the ledger when the cursor is opened;
//! only the stop position is resolved here. A `Specified` stop is never
//! checked against the current height: a future stop is how clients tail
//! a channel.

use crate::domain::{RequestError, SeekPosition};

/// Inclusive block range of one seek request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekRange {
    /// First block delivered.
    pub start: u64,
    /// Last block delivered.
    pub stop: u64,
}

impl SeekRange {
    /// Has the range been exhausted once `number` is delivered?
    pub fn is_last(&self, number: u64) -> bool {
        number == self.stop
    }
}

/// Resolve `stop` against the cursor's start number and the ledger height.
///
/// - `Oldest` stops at the resolved start.
/// - `Newest` stops at `height - 1`.
/// - `Specified(n)` stops at `n`, rejected when `n < start`.
pub fn resolve_range(
    start: u64,
    stop: &SeekPosition,
    height: u64,
) -> Result<SeekRange, RequestError> {
    let stop = match *stop {
        SeekPosition::Oldest => start,
        SeekPosition::Newest => height.saturating_sub(1),
        SeekPosition::Specified(number) => {
            if number < start {
                return Err(RequestError::InvalidRange {
                    start,
                    stop: number,
                });
            }
            number
        }
    };

    Ok(SeekRange { start, stop })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_oldest_stop_is_start() {
        let range = resolve_range(4, &SeekPosition::Oldest, 10).unwrap();
        assert_eq!(range, SeekRange { start: 4, stop: 4 });
    }

    #[test]
    fn test_newest_stop_is_height_minus_one() {
        let range = resolve_range(0, &SeekPosition::Newest, 10).unwrap();
        assert_eq!(range, SeekRange { start: 0, stop: 9 });
    }

    #[test]
    fn test_newest_on_empty_ledger() {
        let range = resolve_range(0, &SeekPosition::Newest, 0).unwrap();
        assert_eq!(range.stop, 0);
    }

    #[test]
    fn test_specified_equal_to_start() {
        let range = resolve_range(3, &SeekPosition::Specified(3), 10).unwrap();
        assert!(range.is_last(3));
    }

    #[test]
    fn test_specified_beyond_height_accepted() {
        let range = resolve_range(3, &SeekPosition::Specified(1_000_000), 10).unwrap();
        assert_eq!(range.stop, 1_000_000);
    }

    #[test]
    fn test_specified_below_start_rejected() {
        assert_eq!(
            resolve_range(5, &SeekPosition::Specified(2), 10),
            Err(RequestError::InvalidRange { start: 5, stop: 2 })
        );
    }

    proptest! {
        #[test]
        fn prop_specified_below_start_always_rejected(start in 1u64..u64::MAX, height in any::<u64>()) {
            let stop = start - 1;
            prop_assert!(resolve_range(start, &SeekPosition::Specified(stop), height).is_err());
        }

        #[test]
        fn prop_specified_at_or_above_start_never_rejected(start in any::<u64>(), delta in 0u64..1_000, height in any::<u64>()) {
            let stop = start.saturating_add(delta);
            let range = resolve_range(start, &SeekPosition::Specified(stop), height).unwrap();
            prop_assert_eq!(range.stop, stop);
            prop_assert_eq!(range.start, start);
        }
    }
}
