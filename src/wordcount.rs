//! Word counting on top of the engine: a mapper emitting `(word, "1")` for every token of
//! its file, and a reducer counting a word's values into a `ResultStore`.

use std::sync::Arc;

use log::{debug, error};

use crate::controller::MRController;
use crate::error::Result;
use crate::formats::lines;
use crate::mapreducer::{DefaultPartitioner, Mapper, Reducer};
use crate::parameters::MRParameters;
use crate::record_types::MEmitter;
use crate::reduce::ReduceCursor;
use crate::results::ResultStore;

/// Splits a line into tokens at spaces, tabs, CR and LF. Empty tokens are dropped.
pub fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split([' ', '\t', '\r', '\n'])
        .filter(|t| !t.is_empty())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WordCountMapper;

impl Mapper for WordCountMapper {
    fn map(&mut self, em: &MEmitter, file_name: &str) {
        let reader = match lines::new_from_file(file_name) {
            Ok(r) => r,
            Err(e) => {
                error!("word count: {}", e);
                return;
            }
        };
        for line in reader {
            for word in tokens(&line) {
                em.emit(word, "1");
            }
        }
        debug!("{}: {} words", file_name, em.emitted());
    }
}

#[derive(Clone)]
pub struct WordCountReducer {
    results: Arc<ResultStore<usize>>,
}

impl WordCountReducer {
    pub fn new(results: Arc<ResultStore<usize>>) -> WordCountReducer {
        WordCountReducer { results }
    }
}

impl Reducer for WordCountReducer {
    fn reduce(&mut self, key: &str, values: &mut ReduceCursor, _: usize) {
        let count = values.values(key).count();
        self.results.put(key, count);
    }
}

/// Counts the words of all `files`.
pub fn word_count<S: AsRef<str>>(
    files: &[S],
    params: MRParameters,
) -> Result<Arc<ResultStore<usize>>> {
    let results = Arc::new(ResultStore::new());
    MRController::run(
        params,
        files,
        WordCountMapper,
        WordCountReducer::new(results.clone()),
        DefaultPartitioner,
    )?;
    Ok(results)
}

/// How often `term` occurs in `files`, or None if it doesn't occur at all.
pub fn word_search<S: AsRef<str>>(files: &[S], term: &str) -> Result<Option<usize>> {
    let results = word_count(files, MRParameters::new().set_concurrency(2, 1))?;
    Ok(results.get(term))
}
