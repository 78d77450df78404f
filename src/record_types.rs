use std::cell::Cell;

use crate::shuffle::ShuffleSink;

/// A (key,value) pair emitted by a mapper. Once emitted, it is owned by exactly one
/// partition store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: &str, value: &str) -> Pair {
        Pair {
            key: String::from(key),
            value: String::from(value),
        }
    }
}

/// Emitter type used in the map phase; used to emit (key,value) pairs into the shuffle.
///
/// Every map job gets its own emitter, and emitters only exist while the map phase of a run
/// is active. An emitter can't be shared with other threads.
pub struct MEmitter<'a> {
    sink: &'a ShuffleSink,
    emitted: Cell<usize>,
}

impl<'a> MEmitter<'a> {
    pub fn new(sink: &'a ShuffleSink) -> MEmitter<'a> {
        MEmitter {
            sink,
            emitted: Cell::new(0),
        }
    }

    /// Routes (key,value) to its partition. Key and value are copied.
    pub fn emit(&self, key: &str, value: &str) {
        self.sink.emit(key, value);
        self.emitted.set(self.emitted.get() + 1);
    }

    /// How many pairs were emitted through this emitter.
    pub fn emitted(&self) -> usize {
        self.emitted.get()
    }
}
