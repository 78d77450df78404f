//! Errors returned by a mapreduce run.
//!
//! Only conditions a caller can act on are represented here. Broken internal
//! invariants (a poisoned partition lock, a partitioner answering outside of
//! `[0; n)`) are fatal and panic instead.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MRError {
    /// The run was configured in a way that can't work, e.g. zero reducers.
    /// Detected before any thread is started.
    #[error("invalid mapreduce parameters: {0}")]
    InvalidParameters(String),

    #[error("couldn't read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MRError>;
