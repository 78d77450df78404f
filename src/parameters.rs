//! Parameters for a mapreduce process.
//!

use crate::error::{MRError, Result};

#[derive(Clone, Debug)]
pub struct MRParameters {
    pub mappers: usize,
    pub reducers: usize,

    pub partition_prealloc_size: usize,

    pub skip_non_files: bool,
}

impl Default for MRParameters {
    fn default() -> MRParameters {
        MRParameters::new()
    }
}

impl MRParameters {
    pub fn new() -> MRParameters {
        MRParameters {
            mappers: 4,
            reducers: 4,
            partition_prealloc_size: 10,
            skip_non_files: true,
        }
    }

    /// Determines how many threads run at once. Mappers and reducers never run at the same
    /// time (the reduce phase waits for every map batch to finish). `mappers` bounds how many
    /// input files are mapped concurrently; the number of reducers is also the number of
    /// partitions the map output is sharded into.
    ///
    /// Default 4/4
    pub fn set_concurrency(mut self, mappers: usize, reducers: usize) -> MRParameters {
        self.mappers = mappers;
        self.reducers = reducers;
        self
    }

    /// How many pairs each partition has room for before its buffer is grown the first time.
    /// The buffer doubles every time it runs full.
    ///
    /// Default 10
    pub fn set_partition_prealloc_size(mut self, n: usize) -> MRParameters {
        self.partition_prealloc_size = n;
        self
    }

    /// Whether arguments without a `.` in their name are treated as flags and not handed to
    /// the mapper. Only turn this off if the file list was filtered already.
    ///
    /// Default: true
    pub fn set_skip_non_files(mut self, skip: bool) -> MRParameters {
        self.skip_non_files = skip;
        self
    }

    /// Checks the preconditions of a run.
    pub fn validate(&self) -> Result<()> {
        if self.mappers == 0 {
            return Err(MRError::InvalidParameters(String::from(
                "mappers must be at least 1",
            )));
        }
        if self.reducers == 0 {
            return Err(MRError::InvalidParameters(String::from(
                "reducers must be at least 1",
            )));
        }
        if self.partition_prealloc_size == 0 {
            return Err(MRError::InvalidParameters(String::from(
                "partition_prealloc_size must be at least 1",
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let p = MRParameters::new()
            .set_concurrency(2, 7)
            .set_partition_prealloc_size(64)
            .set_skip_non_files(false);
        assert_eq!(p.mappers, 2);
        assert_eq!(p.reducers, 7);
        assert_eq!(p.partition_prealloc_size, 64);
        assert!(!p.skip_non_files);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(MRParameters::new().set_concurrency(0, 1).validate().is_err());
        assert!(MRParameters::new().set_concurrency(1, 0).validate().is_err());
        assert!(MRParameters::new()
            .set_partition_prealloc_size(0)
            .validate()
            .is_err());
    }
}
