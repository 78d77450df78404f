//! Input formats read by mapper callbacks.

pub mod lines;
