//! Text exposition format (the line format a metrics collector scrapes).
//!
//! `render` holds the writer helpers used by each metric kind; `parse` reads
//! the same format back for checks and tests.

pub mod parse;
pub mod render;

pub use parse::{find, parse, Sample};

/// Content type served with a snapshot.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
