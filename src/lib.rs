//! Implements a mapreduce process bounded to one machine.
//!
//! Mapper callbacks run over a list of input files on a bounded number of threads and emit
//! (key,value) pairs. The pairs are sharded into one partition per reducer, each partition
//! is sorted by key, and then every non-empty partition is reduced on its own thread; the
//! reducer pulls the values of the current key through a `ReduceCursor`.
//!
//! ```no_run
//! use localmr::{MEmitter, ReduceCursor};
//!
//! fn map(em: &MEmitter, file: &str) {
//!     for line in localmr::formats::lines::new_from_file(file).unwrap() {
//!         for word in line.split_whitespace() {
//!             em.emit(word, "1");
//!         }
//!     }
//! }
//!
//! fn reduce(key: &str, values: &mut ReduceCursor, _partition: usize) {
//!     println!("{} {}", key, values.values(key).count());
//! }
//!
//! localmr::run(&["a.txt", "b.txt"], map, 2, reduce, 1).unwrap();
//! ```

pub mod closure_mr;
pub mod controller;
pub mod error;
pub mod formats;
pub mod map;
pub mod mapreducer;
pub mod parameters;
pub mod partition_store;
pub mod record_types;
pub mod reduce;
pub mod results;
pub mod shuffle;
pub mod sort;
pub mod wordcount;

pub use controller::{run, run_with_partitioner, MRController, RunStats};
pub use error::{MRError, Result};
pub use mapreducer::{default_hash_partition, DefaultPartitioner, Mapper, Partitioner, Reducer};
pub use parameters::MRParameters;
pub use record_types::{MEmitter, Pair};
pub use reduce::ReduceCursor;
pub use results::ResultStore;
