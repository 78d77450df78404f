//! Implements the Map phase.
//!
//! Input files are mapped in batches of at most `mappers` files. Every file of a batch runs
//! as its own job on the pool, and a batch is joined completely before the next one starts,
//! so at most `mappers` map jobs are ever alive at once.

use log::{debug, trace, warn};
use scoped_threadpool::Pool;

use crate::mapreducer::Mapper;
use crate::record_types::MEmitter;
use crate::shuffle::ShuffleSink;

/// Whether a command line argument names an input file. Arguments without a `.` are flags
/// or other non-file arguments.
pub fn is_input_file(arg: &str) -> bool {
    arg.contains('.')
}

/// Splits arguments into (input files, skipped arguments), keeping their order.
pub fn split_inputs<S: AsRef<str>>(args: &[S]) -> (Vec<&str>, Vec<&str>) {
    args.iter()
        .map(|a| a.as_ref())
        .partition(|a| is_input_file(a))
}

/// What the map phase did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapPhaseStats {
    pub files_mapped: usize,
    pub map_batches: usize,
}

/// Maps every file in `files`, `mappers` at a time, then sorts every partition of the sink.
pub fn run_map_phase<M: Mapper>(
    sink: &ShuffleSink,
    files: &[&str],
    mapper: &M,
    mappers: usize,
) -> MapPhaseStats {
    assert!(mappers > 0, "at least one mapper is needed");
    let mut stats = MapPhaseStats::default();
    if files.is_empty() {
        warn!("map phase: no input files");
    } else {
        let mut pool = Pool::new(mappers.min(files.len()) as u32);

        for (i, batch) in files.chunks(mappers).enumerate() {
            debug!("map batch {}: {:?}", i, batch);
            pool.scoped(|scope| {
                for &file in batch {
                    let mut mapper = mapper.clone();
                    scope.execute(move || {
                        let em = MEmitter::new(sink);
                        mapper.map(&em, file);
                        trace!("mapped {}: {} pairs", file, em.emitted());
                    });
                }
            });
            // scoped() only returns once every job of the batch is done.
            stats.map_batches += 1;
            stats.files_mapped += batch.len();
        }
    }

    sink.sort_all();
    stats
}
