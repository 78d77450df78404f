//! A map/reduce/partition triple made of plain functions.

use crate::controller::{MRController, RunStats};
use crate::error::Result;
use crate::mapreducer::{
    default_hash_partition, Mapper, MapperF, Partitioner, PartitionerF, Reducer, ReducerF,
};
use crate::parameters::MRParameters;
use crate::record_types::MEmitter;
use crate::reduce::ReduceCursor;

/// This type implements the Mapper, Reducer and Partitioner traits by calling the supplied
/// functions. If you need state in your mapper or reducer, implement the traits on your own
/// type (or use closures) instead.
#[derive(Clone, Copy)]
pub struct ClosureMapReducer {
    mapper: MapperF,
    reducer: ReducerF,
    partitioner: PartitionerF,
}

impl ClosureMapReducer {
    /// Create a new MapReducer from the supplied functions. Keys are partitioned with
    /// `default_hash_partition`.
    pub fn new(mapper: MapperF, reducer: ReducerF) -> ClosureMapReducer {
        ClosureMapReducer {
            mapper,
            reducer,
            partitioner: default_hash_partition,
        }
    }

    /// Set the function used for partitioning.
    pub fn set_partitioner(&mut self, p: PartitionerF) {
        self.partitioner = p;
    }

    /// Runs these functions over `files`.
    pub fn run<S: AsRef<str>>(&self, files: &[S], params: MRParameters) -> Result<RunStats> {
        MRController::run(params, files, *self, *self, *self)
    }
}

impl Mapper for ClosureMapReducer {
    fn map(&mut self, em: &MEmitter, file_name: &str) {
        (self.mapper)(em, file_name)
    }
}

impl Reducer for ClosureMapReducer {
    fn reduce(&mut self, key: &str, values: &mut ReduceCursor, partition: usize) {
        (self.reducer)(key, values, partition)
    }
}

impl Partitioner for ClosureMapReducer {
    fn partition(&self, key: &str, n: usize) -> usize {
        (self.partitioner)(key, n)
    }
}
