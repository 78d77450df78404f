//! The shuffle: routes emitted pairs into per-partition stores.
//!
//! Every partition has its own lock, so emits into different partitions don't contend.
//! During the map phase all mapper threads write here; afterwards each partition is sorted
//! and handed to one reducer.

use std::sync::{Mutex, MutexGuard};

use log::{error, trace};

use crate::mapreducer::Partitioner;
use crate::partition_store::PartitionStore;
use crate::record_types::Pair;

pub struct ShuffleSink {
    partitions: Vec<Mutex<PartitionStore>>,
    partitioner: Box<dyn Partitioner>,
}

impl ShuffleSink {
    /// Creates `n` empty partitions, each with room for `prealloc` pairs.
    pub fn new(n: usize, prealloc: usize, partitioner: Box<dyn Partitioner>) -> ShuffleSink {
        let partitions = (0..n)
            .map(|_| Mutex::new(PartitionStore::with_capacity(prealloc)))
            .collect();
        ShuffleSink {
            partitions,
            partitioner,
        }
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Copies (key,value) into the partition the partitioner picks for key.
    ///
    /// Panics if the partitioner returns an index out of range, or if the partition's lock
    /// was poisoned by a panicking mapper.
    pub fn emit(&self, key: &str, value: &str) {
        let n = self.num_partitions();
        let p = self.partitioner.partition(key, n);
        if p >= n {
            error!("partitioner put key {:?} into partition {} of {}", key, p, n);
            panic!("partitioner returned {} for {} partitions", p, n);
        }
        let pair = Pair::new(key, value);
        trace!("emit {:?} -> partition {}", key, p);
        self.lock_partition(p).push(pair);
    }

    /// Exclusive access to one partition.
    pub fn lock_partition(&self, p: usize) -> MutexGuard<'_, PartitionStore> {
        match self.partitions[p].lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("lock of partition {} is poisoned", p);
                panic!("lock of partition {} is poisoned: {}", p, e)
            }
        }
    }

    pub fn partition_len(&self, p: usize) -> usize {
        self.lock_partition(p).len()
    }

    pub fn total_pairs(&self) -> usize {
        (0..self.num_partitions())
            .map(|p| self.partition_len(p))
            .sum()
    }

    /// Indices of partitions holding at least one pair.
    pub fn non_empty_partitions(&self) -> Vec<usize> {
        (0..self.num_partitions())
            .filter(|&p| self.partition_len(p) > 0)
            .collect()
    }

    /// Sorts every partition by key. Called once the map phase is over.
    pub fn sort_all(&self) {
        for p in 0..self.num_partitions() {
            self.lock_partition(p).sort();
        }
    }
}
