//! Controls the execution of a mapreduce instance.
//!
//! An `MRController` owns everything one run needs: the parameters, the shuffle sink with
//! its partitions and locks, and the statistics. It is created when a run starts and
//! dropped when it ends, so nothing survives between runs and independent runs can
//! proceed at the same time.

use log::{info, warn};
use time::{Duration, OffsetDateTime};

use crate::error::Result;
use crate::map::{self, run_map_phase};
use crate::mapreducer::{DefaultPartitioner, Mapper, Partitioner, Reducer};
use crate::parameters::MRParameters;
use crate::reduce::run_reduce_phase;
use crate::shuffle::ShuffleSink;

/// Statistics of one completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunStats {
    pub files_mapped: usize,
    pub files_skipped: usize,
    pub map_batches: usize,
    pub pairs_emitted: usize,
    pub partitions_reduced: usize,
    pub keys_reduced: usize,
    pub map_duration: Duration,
    pub reduce_duration: Duration,
}

impl RunStats {
    fn new() -> RunStats {
        RunStats {
            files_mapped: 0,
            files_skipped: 0,
            map_batches: 0,
            pairs_emitted: 0,
            partitions_reduced: 0,
            keys_reduced: 0,
            map_duration: Duration::ZERO,
            reduce_duration: Duration::ZERO,
        }
    }
}

pub struct MRController {
    params: MRParameters,
    sink: ShuffleSink,
    stats: RunStats,
}

impl MRController {
    /// Checks the parameters and sets up `params.reducers` empty partitions.
    fn new(params: MRParameters, partitioner: Box<dyn Partitioner>) -> Result<MRController> {
        params.validate()?;
        let sink = ShuffleSink::new(
            params.reducers,
            params.partition_prealloc_size,
            partitioner,
        );
        Ok(MRController {
            params,
            sink,
            stats: RunStats::new(),
        })
    }

    /// Create a new mapreduce instance and execute it immediately. Blocks until both phases
    /// are complete.
    ///
    /// Only invalid parameters make this fail; that is detected before any mapper runs.
    pub fn run<S, M, R, P>(
        params: MRParameters,
        files: &[S],
        mapper: M,
        reducer: R,
        partitioner: P,
    ) -> Result<RunStats>
    where
        S: AsRef<str>,
        M: Mapper,
        R: Reducer,
        P: Partitioner + 'static,
    {
        let mut controller = MRController::new(params, Box::new(partitioner))?;
        info!(
            "starting mapreduce: {} arguments, {} mappers, {} reducers",
            files.len(),
            controller.params.mappers,
            controller.params.reducers
        );
        controller.run_map(files, &mapper);
        controller.run_reduce(&reducer);
        Ok(controller.clean_up())
    }

    /// Phase 1: map all input files in batches, then sort every partition. Runs once per
    /// controller, before `run_reduce()`.
    fn run_map<S: AsRef<str>, M: Mapper>(&mut self, files: &[S], mapper: &M) {
        let (inputs, skipped) = if self.params.skip_non_files {
            map::split_inputs(files)
        } else {
            (files.iter().map(|f| f.as_ref()).collect(), Vec::new())
        };
        for arg in &skipped {
            warn!("skipping non-file argument {:?}", arg);
        }

        let start = OffsetDateTime::now_utc();
        let map_stats = run_map_phase(&self.sink, &inputs, mapper, self.params.mappers);
        self.stats.map_duration = OffsetDateTime::now_utc() - start;

        self.stats.files_mapped = map_stats.files_mapped;
        self.stats.files_skipped = skipped.len();
        self.stats.map_batches = map_stats.map_batches;
        self.stats.pairs_emitted = self.sink.total_pairs();
    }

    /// Phase 2: reduce every non-empty partition on its own thread. Runs once, after
    /// `run_map()`.
    fn run_reduce<R: Reducer>(&mut self, reducer: &R) {
        let start = OffsetDateTime::now_utc();
        let reduce_stats = run_reduce_phase(&self.sink, reducer);
        self.stats.reduce_duration = OffsetDateTime::now_utc() - start;

        self.stats.partitions_reduced = reduce_stats.partitions_reduced;
        self.stats.keys_reduced = reduce_stats.keys_reduced;
    }

    /// Tears the run down, releasing all intermediate pairs.
    fn clean_up(self) -> RunStats {
        let stats = self.stats;
        info!(
            "mapreduce done: {} files in {} batches ({} skipped), {} pairs, {} keys in {} partitions; map {}, reduce {}",
            stats.files_mapped,
            stats.map_batches,
            stats.files_skipped,
            stats.pairs_emitted,
            stats.keys_reduced,
            stats.partitions_reduced,
            stats.map_duration,
            stats.reduce_duration
        );
        stats
    }
}

/// Runs `mapper` over `files` and `reducer` over the results, partitioning with
/// `default_hash_partition`.
pub fn run<S, M, R>(
    files: &[S],
    mapper: M,
    mappers: usize,
    reducer: R,
    reducers: usize,
) -> Result<RunStats>
where
    S: AsRef<str>,
    M: Mapper,
    R: Reducer,
{
    run_with_partitioner(files, mapper, mappers, reducer, reducers, DefaultPartitioner)
}

/// Like `run()`, with a custom partitioner.
pub fn run_with_partitioner<S, M, R, P>(
    files: &[S],
    mapper: M,
    mappers: usize,
    reducer: R,
    reducers: usize,
    partitioner: P,
) -> Result<RunStats>
where
    S: AsRef<str>,
    M: Mapper,
    R: Reducer,
    P: Partitioner + 'static,
{
    let params = MRParameters::new().set_concurrency(mappers, reducers);
    MRController::run(params, files, mapper, reducer, partitioner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MRError;
    use crate::record_types::MEmitter;
    use crate::reduce::ReduceCursor;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// Treats the file name itself as the input text: "x_y_x.txt" yields x, y, x.
    fn name_words(em: &MEmitter, file: &str) {
        let stem = file.split('.').next().unwrap_or("");
        for w in stem.split('_').filter(|w| !w.is_empty()) {
            em.emit(w, "1");
        }
    }

    fn counting_reducer(
        out: Arc<Mutex<BTreeMap<String, usize>>>,
    ) -> impl FnMut(&str, &mut ReduceCursor, usize) + Send + Clone {
        move |key: &str, values: &mut ReduceCursor, _: usize| {
            let n = values.values(key).count();
            out.lock().unwrap().insert(key.to_string(), n);
        }
    }

    #[test]
    fn test_run_counts() {
        let out = Arc::new(Mutex::new(BTreeMap::new()));
        let stats = run(
            &["x_y_x.txt", "y_y.txt"],
            name_words,
            2,
            counting_reducer(out.clone()),
            1,
        )
        .unwrap();

        let out = out.lock().unwrap();
        assert_eq!(out.get("x"), Some(&2));
        assert_eq!(out.get("y"), Some(&3));
        assert_eq!(out.len(), 2);

        assert_eq!(stats.files_mapped, 2);
        assert_eq!(stats.map_batches, 1);
        assert_eq!(stats.pairs_emitted, 5);
        assert_eq!(stats.partitions_reduced, 1);
        assert_eq!(stats.keys_reduced, 2);
    }

    #[test]
    fn test_non_files_are_skipped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let mapper = move |_: &MEmitter, file: &str| seen2.lock().unwrap().push(file.to_string());
        let reducer = |_: &str, _: &mut ReduceCursor, _: usize| {};

        let stats = run(&["-v", "a.txt", "flag"], mapper, 4, reducer, 2).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![String::from("a.txt")]);
        assert_eq!(stats.files_mapped, 1);
        assert_eq!(stats.files_skipped, 2);
        assert_eq!(stats.partitions_reduced, 0);
    }

    #[test]
    fn test_skip_rule_can_be_disabled() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        let mapper = move |_: &MEmitter, file: &str| seen2.lock().unwrap().push(file.to_string());
        let reducer = |_: &str, _: &mut ReduceCursor, _: usize| {};
        let params = MRParameters::new()
            .set_concurrency(1, 1)
            .set_skip_non_files(false);

        let stats =
            MRController::run(params, &["plain", "b.txt"], mapper, reducer, DefaultPartitioner)
                .unwrap();
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![String::from("plain"), String::from("b.txt")]
        );
    }

    #[test]
    fn test_partitions_sorted_after_map() {
        let params = MRParameters::new()
            .set_concurrency(3, 4)
            .set_partition_prealloc_size(1);
        let mut c = MRController::new(params, Box::new(DefaultPartitioner)).unwrap();
        c.run_map(
            &["d_c_b_a_d_c.txt", "a_b_zz_b.txt", "q_a_b.txt", "e_e_e.txt"],
            &name_words,
        );

        assert_eq!(c.stats.pairs_emitted, 16);
        assert_eq!(c.stats.files_mapped, 4);
        assert_eq!(c.stats.keys_reduced, 0);
        for p in 0..4 {
            let store = c.sink.lock_partition(p);
            assert!(store.is_sorted());
            // Grouping: once a key is left behind it never shows up again.
            let mut done: Vec<&str> = Vec::new();
            let mut prev: Option<&str> = None;
            for pair in store.pairs() {
                if prev != Some(pair.key.as_str()) {
                    assert!(!done.contains(&pair.key.as_str()));
                    if let Some(k) = prev {
                        done.push(k);
                    }
                    prev = Some(pair.key.as_str());
                }
            }
        }
    }

    #[test]
    fn test_custom_partitioner() {
        let out = Arc::new(Mutex::new(BTreeMap::new()));
        let everything_to_two = |_: &str, _: usize| -> usize { 2 };
        let stats = run_with_partitioner(
            &["a_b_c.txt", "c_d.txt"],
            name_words,
            2,
            counting_reducer(out.clone()),
            3,
            everything_to_two,
        )
        .unwrap();

        assert_eq!(stats.partitions_reduced, 1);
        assert_eq!(stats.keys_reduced, 4);
        assert_eq!(out.lock().unwrap().get("c"), Some(&2));
    }

    #[test]
    fn test_invalid_parameters() {
        let reducer = |_: &str, _: &mut ReduceCursor, _: usize| {};
        match run(&["a.txt"], name_words, 1, reducer, 0) {
            Err(MRError::InvalidParameters(_)) => (),
            other => panic!("expected InvalidParameters, got {:?}", other),
        }
        match run(&["a.txt"], name_words, 0, reducer, 1) {
            Err(MRError::InvalidParameters(_)) => (),
            other => panic!("expected InvalidParameters, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_runs_agree() {
        let files = [
            "a_b_a_c.txt",
            "c_c_b.txt",
            "-x",
            "d_a.txt",
            "b_b_b_b.txt",
            "e.txt",
        ];
        let mut results = Vec::new();
        for _ in 0..3 {
            let out = Arc::new(Mutex::new(BTreeMap::new()));
            run(&files, name_words, 3, counting_reducer(out.clone()), 4).unwrap();
            let out = out.lock().unwrap().clone();
            results.push(out);
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
        assert_eq!(results[0].get("b"), Some(&6));
    }

    #[test]
    fn test_independent_runs_in_parallel() {
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    s.spawn(move || {
                        let out = Arc::new(Mutex::new(BTreeMap::new()));
                        let file = format!("w{}_w{}_v.txt", i, i);
                        run(&[file], name_words, 1, counting_reducer(out.clone()), 2).unwrap();
                        let out = out.lock().unwrap().clone();
                        out
                    })
                })
                .collect();
            for (i, h) in handles.into_iter().enumerate() {
                let out = h.join().unwrap();
                assert_eq!(out.len(), 2);
                assert_eq!(out.get(&format!("w{}", i)), Some(&2));
                assert_eq!(out.get("v"), Some(&1));
            }
        });
    }
}
