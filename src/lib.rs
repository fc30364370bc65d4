//! `jsel`: a CSS-inspired selector engine for querying JSON documents.
//!
//! Given a [`serde_json::Value`] document and a selector expression such as
//! `.eobj > number` or `:has(.lang:val("Spanish")) > .level`, this crate
//! yields, in document order, the subset of values inside the document that
//! satisfy the selector.
//!
//! # Overview
//!
//! A selector group is parsed once into an immutable [`Plan`](query::Plan),
//! which can then be bound to any number of DOM roots. Each binding produces
//! a [`Handle`](query::Handle) that lazily walks the document and yields
//! matched nodes one at a time:
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({"enum": 3, "ebool": true, "eobj": {"ch1": 5, "ch2": false}});
//! let plan = jsel::parse(".eobj > number").unwrap();
//! let matches = jsel::all(&plan, &doc);
//! assert_eq!(matches, vec![&json!(5)]);
//! ```
//!
//! # Grammar
//!
//! ```text
//! group       = compound ("," compound)*
//! compound    = simple (combinator simple)*
//! combinator  = WS | ">" | "~"
//! simple      = atom+
//! atom        = type | "*" | key | pseudo
//! key         = "." (identifier | string)
//! pseudo      = ":" identifier [ "(" pseudo_arg ")" ]
//! ```
//!
//! Recognised type atoms: `object`, `array`, `string`, `number`, `boolean`,
//! `null`. Recognised pseudo-classes: `:root`, `:first-child`,
//! `:last-child`, `:nth-child(N)`, `:nth-last-child(N)`, `:only-child`,
//! `:empty`, `:val(V)`, `:contains(S)`, `:has(G)`, `:expr(x OP literal)`.
//!
//! # Design
//!
//! The engine is single-threaded cooperative per [`Handle`](query::Handle):
//! plans are `Send + Sync` and may be shared by reference across handles,
//! each of which owns its own traversal stack and borrows the DOM
//! read-only. Evaluation never raises an error; a pseudo-class applied to a
//! mismatched type (`.k:val(42)` against a string) simply fails to match.
//! Parsing is the only fallible operation, returning a [`ParseError`] whose
//! message text is part of the crate's contract.

mod ast;
mod compile;
mod dom;
mod error;
mod eval;
mod parser;
mod query;
mod token;
pub mod trace;

pub use compile::Plan;
pub use error::ParseError;
pub use eval::Handle;
pub use query::{all, first, parse};
pub use trace::Verbosity;

/// Parses `text` and prints the resulting selector tree to stdout.
///
/// Pure development tooling for embedders debugging why a selector group
/// didn't match what they expected — not part of evaluated semantics. I/O
/// failure writing to stdout is not a condition callers need to recover
/// from, so it is silently ignored.
pub fn debug_print(text: &str) -> Result<(), ParseError> {
    let ast = parser::parse(text)?;
    let _ = ast.print();
    Ok(())
}
