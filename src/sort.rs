//! Key comparison used to order partitions before the reduce phase.

use std::cmp::Ordering;

use crate::record_types::Pair;

/// Function type to be used as custom compare function.
pub type Comparer<T> = fn(a: &T, b: &T) -> Ordering;

/// Compares the keys of two pairs byte by byte, like strcmp(3). Upper case sorts before
/// lower case ('B' < 'a').
#[inline]
pub fn bytewise_key_compare(a: &Pair, b: &Pair) -> Ordering {
    a.key.as_bytes().cmp(b.key.as_bytes())
}

/// Sorts pairs ascending by key. Pairs with equal keys end up next to each other; their
/// relative order is unspecified.
pub fn sort_pairs(pairs: &mut [Pair], cmp: Comparer<Pair>) {
    pairs.sort_unstable_by(cmp);
}

/// Whether pairs are in ascending key order (and therefore grouped by key).
pub fn is_sorted_by_key(pairs: &[Pair]) -> bool {
    pairs
        .windows(2)
        .all(|w| bytewise_key_compare(&w[0], &w[1]) != Ordering::Greater)
}
