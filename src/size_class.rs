//! Size classes: the fixed ladder of prime bucket counts a dictionary climbs.
//!
//! Each class pairs a load threshold with a prime capacity. A dictionary
//! starts at class 0 and moves up one class whenever its live-entry count
//! reaches the threshold of the class it is in. The last class is the
//! ceiling: its threshold can never be reached, so growth stops there.

/// One rung of the capacity ladder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SizeClass {
    /// Live-entry count at or above which the next `set` grows the table.
    pub threshold: usize,
    /// Number of buckets (always prime).
    pub capacity: usize,
}

const fn class(threshold: usize, capacity: usize) -> SizeClass {
    SizeClass {
        threshold,
        capacity,
    }
}

/// Capacities roughly double per step; thresholds are `2^(n+6) - 1`.
pub const SIZE_CLASSES: [SizeClass; 26] = [
    class((1 << 6) - 1, 53),
    class((1 << 7) - 1, 97),
    class((1 << 8) - 1, 193),
    class((1 << 9) - 1, 389),
    class((1 << 10) - 1, 769),
    class((1 << 11) - 1, 1543),
    class((1 << 12) - 1, 3079),
    class((1 << 13) - 1, 6151),
    class((1 << 14) - 1, 12289),
    class((1 << 15) - 1, 24593),
    class((1 << 16) - 1, 49157),
    class((1 << 17) - 1, 98317),
    class((1 << 18) - 1, 196613),
    class((1 << 19) - 1, 393241),
    class((1 << 20) - 1, 786433),
    class((1 << 21) - 1, 1572869),
    class((1 << 22) - 1, 3145739),
    class((1 << 23) - 1, 6291469),
    class((1 << 24) - 1, 12582917),
    class((1 << 25) - 1, 25165843),
    class((1 << 26) - 1, 50331653),
    class((1 << 27) - 1, 100663319),
    class((1 << 28) - 1, 201326611),
    class((1 << 29) - 1, 402653189),
    class((1 << 30) - 1, 805306457),
    class(usize::MAX, 1610612741),
];

/// Index of the last class. Dictionaries never grow past it.
pub const CEILING: usize = SIZE_CLASSES.len() - 1;

/// Returns the class a dictionary holding `len` live entries in class
/// `index` should move to, or `None` if it stays put.
#[inline]
pub fn next_class(index: usize, len: usize) -> Option<usize> {
    if index >= CEILING || len < SIZE_CLASSES[index].threshold {
        return None;
    }
    Some(index + 1)
}
