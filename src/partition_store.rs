//! Buffer holding the intermediate pairs of one partition.
//!
//! A partition store only grows during the map phase. Its capacity starts at a configured
//! size and doubles whenever a push finds the buffer full; it never shrinks. Once the map
//! phase is over, the store is sorted by key and read by exactly one reducer.

use log::trace;

use crate::record_types::Pair;
use crate::sort::{self, bytewise_key_compare};

#[derive(Debug)]
pub struct PartitionStore {
    pairs: Vec<Pair>,
    capacity: usize,
}

impl PartitionStore {
    pub fn with_capacity(capacity: usize) -> PartitionStore {
        let capacity = capacity.max(1);
        PartitionStore {
            pairs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a pair, taking ownership of it. Grows the buffer first if it is full.
    pub fn push(&mut self, pair: Pair) {
        if self.pairs.len() == self.capacity {
            self.grow();
        }
        self.pairs.push(pair);
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity * 2;
        self.pairs.reserve_exact(new_capacity - self.pairs.len());
        trace!("partition buffer grown from {} to {}", self.capacity, new_capacity);
        self.capacity = new_capacity;
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs that fit before the next growth.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sorts the pairs ascending by key (byte-wise).
    pub fn sort(&mut self) {
        sort::sort_pairs(&mut self.pairs, bytewise_key_compare);
    }

    pub fn is_sorted(&self) -> bool {
        sort::is_sorted_by_key(&self.pairs)
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn get(&self, i: usize) -> Option<&Pair> {
        self.pairs.get(i)
    }
}
