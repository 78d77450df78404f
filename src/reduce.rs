//! Implements the Reduce phase.
//!
//! Each non-empty partition is reduced by one thread. That thread holds the partition's lock
//! for its whole pass, walks the sorted pairs once and calls the reducer for every new key.
//! The reducer pulls the key's values through a `ReduceCursor`.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use scoped_threadpool::Pool;

use crate::mapreducer::Reducer;
use crate::record_types::Pair;
use crate::shuffle::ShuffleSink;

/// Sequential read position into one sorted partition.
///
/// The position only moves forward, and only over pairs whose key matches the key asked
/// for; on the first mismatch the cursor stays put on the first pair of the next key.
pub struct ReduceCursor<'a> {
    pairs: &'a [Pair],
    position: usize,
    partition: usize,
}

impl<'a> ReduceCursor<'a> {
    pub fn new(pairs: &'a [Pair], partition: usize) -> ReduceCursor<'a> {
        ReduceCursor {
            pairs,
            position: 0,
            partition,
        }
    }

    /// Returns the next value for `key` and advances, or None if the partition is exhausted
    /// or the pair under the cursor belongs to a different key. None never advances.
    pub fn get_next(&mut self, key: &str) -> Option<&'a str> {
        let pair = self.pairs.get(self.position)?;
        if pair.key != key {
            return None;
        }
        self.position += 1;
        Some(&pair.value)
    }

    /// Iterates over the remaining values of `key`; draining the iterator drains the key.
    pub fn values<'c>(&'c mut self, key: &'c str) -> Values<'c, 'a> {
        Values { cursor: self, key }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The partition this cursor reads.
    pub fn partition(&self) -> usize {
        self.partition
    }

    pub fn is_exhausted(&self) -> bool {
        self.position == self.pairs.len()
    }
}

/// Iterator returned by `ReduceCursor::values()`.
pub struct Values<'c, 'a> {
    cursor: &'c mut ReduceCursor<'a>,
    key: &'c str,
}

impl<'c, 'a> Iterator for Values<'c, 'a> {
    type Item = &'a str;
    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.get_next(self.key)
    }
}

/// Calls the reducer once per distinct key of a sorted partition. Returns the number of
/// reducer calls.
///
/// A key boundary is a pair whose key differs from the key the reducer was last called
/// with. If the reducer returns without draining its key, the rest of that key's pairs are
/// skipped here, and the cursor stays parked on them so later keys see no values either.
pub fn reduce_partition<R: Reducer>(reducer: &mut R, pairs: &[Pair], partition: usize) -> usize {
    let mut cursor = ReduceCursor::new(pairs, partition);
    let mut last_invoked: Option<&str> = None;
    let mut keys = 0;

    for pair in pairs {
        if last_invoked == Some(pair.key.as_str()) {
            continue;
        }
        reducer.reduce(&pair.key, &mut cursor, partition);
        last_invoked = Some(pair.key.as_str());
        keys += 1;
    }

    if !cursor.is_exhausted() {
        warn!(
            "partition {}: reducer left {} of {} values unread",
            partition,
            pairs.len() - cursor.position(),
            pairs.len()
        );
    }
    keys
}

/// What the reduce phase did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReducePhaseStats {
    pub partitions_reduced: usize,
    pub keys_reduced: usize,
}

/// Runs one thread per non-empty partition and waits for all of them. Partitions must be
/// sorted already.
pub fn run_reduce_phase<R: Reducer>(sink: &ShuffleSink, reducer: &R) -> ReducePhaseStats {
    let partitions = sink.non_empty_partitions();
    if partitions.is_empty() {
        debug!("reduce phase: nothing to reduce");
        return ReducePhaseStats::default();
    }

    let keys = AtomicUsize::new(0);
    let mut pool = Pool::new(partitions.len() as u32);

    pool.scoped(|scope| {
        for &p in &partitions {
            let mut reducer = reducer.clone();
            let keys = &keys;
            scope.execute(move || {
                let store = sink.lock_partition(p);
                let n = reduce_partition(&mut reducer, store.pairs(), p);
                debug!("partition {}: reduced {} keys from {} pairs", p, n, store.len());
                keys.fetch_add(n, Ordering::Relaxed);
            });
        }
    });

    ReducePhaseStats {
        partitions_reduced: partitions.len(),
        keys_reduced: keys.into_inner(),
    }
}
