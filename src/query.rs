//! Public entry points (§4.6, §6): parse selector text into a [`Plan`],
//! bind it to a DOM root to get a [`Handle`], and two convenience wrappers
//! over the handle lifecycle.

use serde_json::Value;

pub use crate::compile::Plan;
pub use crate::eval::Handle;
use crate::error::ParseError;
use crate::trace::{Tracer, Verbosity};

/// Parse selector text into an immutable, shareable plan.
///
/// Never partially commits: on the first offending token the whole
/// operation fails and no plan is produced.
pub fn parse(text: &str) -> Result<Plan, ParseError> {
    let ast = crate::parser::parse(text)?;
    Ok(crate::compile::compile(ast))
}

impl Plan {
    /// Bind this plan to a DOM root, ready to traverse. Root binding is
    /// infallible in Rust: the BindError case from the source contract
    /// (`root is null`) cannot arise when the root is an ordinary `&Value`
    /// borrow rather than a nullable pointer.
    pub fn bind<'p, 'v>(&'p self, root: &'v Value) -> Handle<'p, 'v> {
        Handle::new(self, root, Tracer::new(Verbosity::None))
    }

    /// Like [`Plan::bind`], but the returned handle prints traversal
    /// diagnostics at the given verbosity (debug builds only).
    pub fn bind_traced<'p, 'v>(&'p self, root: &'v Value, verbosity: Verbosity) -> Handle<'p, 'v> {
        self.bind(root).with_verbosity(verbosity)
    }
}

/// The first node `plan` matches under `root`, or `None` if it matches
/// nothing.
pub fn first<'v>(plan: &Plan, root: &'v Value) -> Option<&'v Value> {
    plan.bind(root).next()
}

/// Every node `plan` matches under `root`, in document order, without
/// deduplication across selector-group branches.
pub fn all<'v>(plan: &Plan, root: &'v Value) -> Vec<&'v Value> {
    let mut handle = plan.bind(root);
    let mut out = Vec::new();
    while let Some(v) = handle.next() {
        out.push(v);
    }
    out
}
