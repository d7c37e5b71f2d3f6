// Path: crates/relayer/src/epoch.rs

//! Block-number to epoch mapping.
//!
//! Epochs are numbered from 1 and epoch `k` covers blocks
//! `(k-1)*size + 1 ..= k*size`. Block 0 is genesis and belongs to no epoch;
//! the functions below are total but their result for 0 carries no meaning.

use std::num::NonZeroU64;

/// Position of `number` within its epoch, in `[1, size]`.
pub fn within_epoch(number: u64, size: NonZeroU64) -> u64 {
    match number % size {
        0 => size.get(),
        n => n,
    }
}

/// Whether `number` closes its epoch.
pub fn is_last_of_epoch(number: u64, size: NonZeroU64) -> bool {
    within_epoch(number, size) == size.get()
}

/// The epoch containing block `number`.
pub fn epoch_of(number: u64, size: NonZeroU64) -> u64 {
    if is_last_of_epoch(number, size) {
        number / size
    } else {
        number / size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_test_utils::assert_in_range;
    use proptest::prelude::*;

    fn size(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn epoch_bounds(epoch: u64, size: NonZeroU64) -> (u64, u64) {
        let last = epoch.saturating_mul(size.get());
        (last - size.get() + 1, last)
    }

    #[test]
    fn epoch_boundaries_at_size_1000() {
        let s = size(1000);
        assert_eq!(epoch_of(1, s), 1);
        assert_eq!(epoch_of(999, s), 1);
        assert_eq!(epoch_of(1000, s), 1);
        assert_eq!(epoch_of(1001, s), 2);
        assert_eq!(epoch_of(2000, s), 2);
        assert_eq!(epoch_of(2001, s), 3);
        assert!(is_last_of_epoch(1000, s));
        assert!(!is_last_of_epoch(999, s));
        assert_eq!(within_epoch(1000, s), 1000);
        assert_eq!(within_epoch(1001, s), 1);
    }

    #[test]
    fn size_one_makes_every_block_its_own_epoch() {
        let s = size(1);
        for n in 1..50 {
            assert!(is_last_of_epoch(n, s));
            assert_eq!(epoch_of(n, s), n);
        }
    }

    #[test]
    fn bounds_cover_the_epoch() {
        let s = size(1000);
        assert_eq!(epoch_bounds(1, s), (1, 1000));
        assert_eq!(epoch_bounds(3, s), (2001, 3000));
    }

    proptest! {
        #[test]
        fn within_epoch_stays_in_range(n in 1u64.., s in 1u64..100_000) {
            let w = within_epoch(n, size(s));
            assert_in_range!(w, 1, s);
        }

        #[test]
        fn block_lies_within_its_epoch_bounds(n in 1u64..u64::MAX / 2, s in 1u64..100_000) {
            let sz = size(s);
            let (first, last) = epoch_bounds(epoch_of(n, sz), sz);
            prop_assert!(first <= n && n <= last);
            prop_assert_eq!(within_epoch(n, sz), n - first + 1);
        }
    }
}
