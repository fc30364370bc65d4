//! Debug-only traversal tracer: an opt-in verbosity level gating `println!`
//! calls that cost nothing once `cfg(debug_assertions)` is off. No
//! `log`/`tracing` dependency — a small leveled print type is enough for a
//! parser/compiler library of this shape.

use serde_json::Value;

/// Each level implies everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No tracing.
    None,
    /// Log only successful matches.
    Matches,
    /// Log every node visited, plus matches.
    Visits,
}

#[derive(Clone, Copy)]
pub(crate) struct Tracer(Verbosity);

impl Tracer {
    pub fn new(verbosity: Verbosity) -> Self {
        Tracer(verbosity)
    }

    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub fn visit(&self, depth: usize, key: Option<&str>) {
        #[cfg(debug_assertions)]
        if self.0 >= Verbosity::Visits {
            println!("[jsel visit] depth={depth} key={key:?}");
        }
    }

    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub fn matched(&self, value: &Value) {
        #[cfg(debug_assertions)]
        if self.0 >= Verbosity::Matches {
            println!("[jsel match] {value}");
        }
    }
}
