//! The Mapper, Reducer and Partitioner traits and associated types.

use crate::record_types::MEmitter;
use crate::reduce::ReduceCursor;

/// Default partitioning function: the djb2 string hash (`hash * 33 + byte`, seeded with 5381)
/// over the key's bytes, modulo `n`.
///
/// Panics if `n` is 0.
pub fn default_hash_partition(key: &str, n: usize) -> usize {
    assert!(n > 0, "number of partitions must be positive");
    let mut hash: u64 = 5381;
    for b in key.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as u64);
    }
    (hash % n as u64) as usize
}

/// Map() function type. The file name is the input; the MEmitter is used to emit pairs.
pub type MapperF = fn(&MEmitter, &str);
/// Reduce() function type. Takes the key, the cursor to pull its values from, and the
/// partition number.
pub type ReducerF = fn(&str, &mut ReduceCursor, usize);
/// A function used to determine the partition a key belongs in.
/// The first argument is the key, the second one the number of partitions;
/// the return value should be in [0; n).
pub type PartitionerF = fn(&str, usize) -> usize;

pub trait Mapper: Send + Clone {
    /// Takes one input file name and an emitter. The emitter is used to yield (key,value)
    /// pairs from the map phase; it must not leave the thread map() was called on.
    ///
    /// Every map job runs on its own clone of the mapper.
    fn map(&mut self, em: &MEmitter, file_name: &str);
}

pub trait Reducer: Send + Clone {
    /// Takes one key and the cursor positioned at that key's first value.
    ///
    /// The reducer must call `values.get_next(key)` until it returns None before returning.
    /// Values it leaves unread are lost: the cursor stays parked on them, and the driver
    /// has already moved past their key.
    ///
    /// Every non-empty partition is reduced by its own clone of the reducer.
    fn reduce(&mut self, key: &str, values: &mut ReduceCursor, partition: usize);
}

pub trait Partitioner: Send + Sync {
    /// Determines how to map keys to partitions (and thus reducers).
    /// Returns a number in [0; n). Must be deterministic.
    /// The default implementation is `default_hash_partition`.
    fn partition(&self, key: &str, n: usize) -> usize {
        default_hash_partition(key, n)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPartitioner;

impl Partitioner for DefaultPartitioner {}

impl<F> Mapper for F
where
    F: FnMut(&MEmitter, &str) + Send + Clone,
{
    fn map(&mut self, em: &MEmitter, file_name: &str) {
        self(em, file_name)
    }
}

impl<F> Reducer for F
where
    F: FnMut(&str, &mut ReduceCursor, usize) + Send + Clone,
{
    fn reduce(&mut self, key: &str, values: &mut ReduceCursor, partition: usize) {
        self(key, values, partition)
    }
}

impl<F> Partitioner for F
where
    F: Fn(&str, usize) -> usize + Send + Sync,
{
    fn partition(&self, key: &str, n: usize) -> usize {
        self(key, n)
    }
}
