//! Evaluator and match iterator (§4.5): a depth-first walk of the DOM that
//! tests, at each visited node, whether the compiled plan's subject matches
//! there — yielding in document order, lazily, one match per `next()` call.
//!
//! Ancestor/sibling context is never stored on the DOM; the walker carries
//! it as an explicit stack of [`NodeCtx`] frames (one per level of nesting)
//! that it pushes and pops as it descends and backtracks, per the "ancestor
//! stack during descent" design note.

use std::collections::VecDeque;

use serde_json::Value;

use crate::ast::{Combinator, ExprOp};
use crate::compile::{CompiledCompound, CompiledPseudo, CompiledSimple, KeyTest, Plan, TypeTest};
use crate::dom::{self, Node, Tag};
use crate::trace::{Tracer, Verbosity};

/// A node's identity together with the context the evaluator needs to test
/// ancestor- and sibling-relative pseudo-classes against it: its key under
/// the immediate parent (if any), its 0-based position among the parent's
/// entries, and how many entries the parent has in total.
#[derive(Clone, Copy)]
pub(crate) struct NodeCtx<'v> {
    pub value: &'v Value,
    pub key: Option<&'v str>,
    pub index: usize,
    pub sibling_count: usize,
}

impl<'v> NodeCtx<'v> {
    fn root(value: &'v Value) -> Self {
        NodeCtx {
            value,
            key: None,
            index: 0,
            sibling_count: 1,
        }
    }
}

fn matches_type(value: &Value, test: &TypeTest) -> bool {
    let wanted = match test {
        TypeTest::Any => return true,
        TypeTest::Impossible => return false,
        TypeTest::One(t) => *t,
    };
    use crate::ast::TypeAtom::*;
    matches!(
        (wanted, value.tag()),
        (Object, Tag::Object)
            | (Array, Tag::Array)
            | (String, Tag::String)
            | (Number, Tag::Number)
            | (Boolean, Tag::Boolean)
            | (Null, Tag::Null)
    )
}

fn matches_key(ctx: &NodeCtx, test: &KeyTest) -> bool {
    match test {
        KeyTest::Any => true,
        KeyTest::Impossible => false,
        KeyTest::One(k) => ctx.key == Some(k.as_str()),
    }
}

fn expr_cmp(op: ExprOp, lhs: f64, rhs: f64) -> bool {
    match op {
        ExprOp::Lt => lhs < rhs,
        ExprOp::Le => lhs <= rhs,
        ExprOp::Gt => lhs > rhs,
        ExprOp::Ge => lhs >= rhs,
        ExprOp::Eq => lhs == rhs,
        ExprOp::Ne => lhs != rhs,
    }
}

fn pseudo_matches(pseudo: &CompiledPseudo, stack: &[NodeCtx]) -> bool {
    let ctx = stack.last().expect("stack is never empty while matching");
    let has_parent = stack.len() > 1;
    match pseudo {
        CompiledPseudo::Root => stack.len() == 1,
        CompiledPseudo::FirstChild => has_parent && ctx.index == 0,
        CompiledPseudo::LastChild => has_parent && ctx.index + 1 == ctx.sibling_count,
        CompiledPseudo::NthChild(n) => has_parent && ctx.index + 1 == *n as usize,
        CompiledPseudo::NthLastChild(n) => {
            has_parent && ctx.sibling_count - ctx.index == *n as usize
        }
        CompiledPseudo::OnlyChild => has_parent && ctx.sibling_count == 1,
        CompiledPseudo::Empty => ctx.value.container_len() == Some(0),
        CompiledPseudo::Val(lit) => ctx.value.equals_literal(lit),
        CompiledPseudo::Contains(needle) => {
            ctx.value.as_str().is_some_and(|s| s.contains(needle.as_str()))
        }
        CompiledPseudo::Has(sub_plan) => has_match(sub_plan, ctx.value),
        CompiledPseudo::Expr(op, lit) => match (ctx.value.as_f64(), lit) {
            (Some(v), crate::ast::Literal::Num(n)) => expr_cmp(*op, v, *n),
            _ => false,
        },
    }
}

fn simple_matches(simple: &CompiledSimple, stack: &[NodeCtx]) -> bool {
    let ctx = stack.last().expect("stack is never empty while matching");
    if !matches_type(ctx.value, &simple.type_test) {
        return false;
    }
    if !matches_key(ctx, &simple.key_test) {
        return false;
    }
    simple.pseudos.iter().all(|p| pseudo_matches(p, stack))
}

/// Child context for sibling index `index` under `parent`, if it exists.
fn child_ctx<'v>(parent: &'v Value, index: usize) -> Option<NodeCtx<'v>> {
    let kids = dom::children(parent);
    kids.get(index)
        .map(|(key, value)| NodeCtx {
            value,
            key: *key,
            index,
            sibling_count: kids.len(),
        })
}

/// Tests whether `segments[..=last]`/`combinators[..last]` hold at `stack`,
/// recursing left through the combinator chain. `stack.last()` is always
/// the candidate for `segments[last]`.
fn test_chain(segments: &[CompiledSimple], combinators: &[Combinator], stack: &[NodeCtx]) -> bool {
    let last = segments.len() - 1;
    if !simple_matches(&segments[last], stack) {
        return false;
    }
    if last == 0 {
        return true;
    }
    let left_segments = &segments[..last];
    let left_combinators = &combinators[..last - 1];
    match combinators[last - 1] {
        Combinator::Descendant => {
            for j in (0..stack.len() - 1).rev() {
                if test_chain(left_segments, left_combinators, &stack[..=j]) {
                    return true;
                }
            }
            false
        }
        Combinator::Child => {
            if stack.len() < 2 {
                return false;
            }
            test_chain(left_segments, left_combinators, &stack[..stack.len() - 1])
        }
        Combinator::Sibling => {
            if stack.len() < 2 {
                return false;
            }
            let parent = stack[stack.len() - 2].value;
            let cur_index = stack[stack.len() - 1].index;
            for sib_index in 0..cur_index {
                let Some(sib_ctx) = child_ctx(parent, sib_index) else {
                    continue;
                };
                let mut sub_stack: Vec<NodeCtx> = stack[..stack.len() - 1].to_vec();
                sub_stack.push(sib_ctx);
                if test_chain(left_segments, left_combinators, &sub_stack) {
                    return true;
                }
            }
            false
        }
    }
}

fn compound_matches(compound: &CompiledCompound, stack: &[NodeCtx]) -> bool {
    test_chain(&compound.segments, &compound.combinators, stack)
}

/// `:has(G)`: does the subtree rooted at `scoped_root`, excluding itself,
/// contain a node matching `sub_plan`? Re-enters with a fresh stack; the
/// DOM is a tree, so this can never cycle.
fn has_match(sub_plan: &Plan, scoped_root: &Value) -> bool {
    let mut stack = vec![NodeCtx::root(scoped_root)];
    has_match_descend(sub_plan, &mut stack)
}

fn has_match_descend<'v>(sub_plan: &Plan, stack: &mut Vec<NodeCtx<'v>>) -> bool {
    let kids = dom::children(stack.last().unwrap().value);
    let count = kids.len();
    for (index, (key, value)) in kids.into_iter().enumerate() {
        stack.push(NodeCtx {
            value,
            key,
            index,
            sibling_count: count,
        });
        let matched = sub_plan.compounds.iter().any(|c| compound_matches(c, stack))
            || has_match_descend(sub_plan, stack);
        stack.pop();
        if matched {
            return true;
        }
    }
    false
}

struct StackFrame<'v> {
    ctx: NodeCtx<'v>,
    kids: Vec<(Option<&'v str>, &'v Value)>,
    next_child: usize,
}

impl<'v> StackFrame<'v> {
    fn new(ctx: NodeCtx<'v>) -> Self {
        let kids = dom::children(ctx.value);
        StackFrame {
            ctx,
            kids,
            next_child: 0,
        }
    }
}

/// Stateful traversal bound to a plan and a DOM root. Exclusively used by a
/// single caller; `next()` performs the minimum work to produce the next
/// match and then suspends, holding state proportional to the current DOM
/// depth.
pub struct Handle<'p, 'v> {
    plan: &'p Plan,
    root: &'v Value,
    stack: Vec<StackFrame<'v>>,
    pending: VecDeque<&'v Value>,
    tracer: Tracer,
}

impl<'p, 'v> Handle<'p, 'v> {
    pub(crate) fn new(plan: &'p Plan, root: &'v Value, tracer: Tracer) -> Self {
        let mut handle = Handle {
            plan,
            root,
            stack: Vec::new(),
            pending: VecDeque::new(),
            tracer,
        };
        handle.restart();
        handle
    }

    fn restart(&mut self) {
        self.stack.clear();
        self.pending.clear();
        self.stack.push(StackFrame::new(NodeCtx::root(self.root)));
        self.visit_current();
    }

    fn visit_current(&mut self) {
        let ctxs: Vec<NodeCtx<'v>> = self.stack.iter().map(|f| f.ctx).collect();
        self.tracer.visit(ctxs.len(), ctxs.last().and_then(|c| c.key));
        for compound in &self.plan.compounds {
            if compound_matches(compound, &ctxs) {
                self.tracer.matched(ctxs.last().unwrap().value);
                self.pending.push_back(ctxs.last().unwrap().value);
            }
        }
    }

    /// Advance the traversal and return the next matched node, or `None`
    /// once the plan is exhausted for this root.
    pub fn next(&mut self) -> Option<&'v Value> {
        loop {
            if let Some(v) = self.pending.pop_front() {
                return Some(v);
            }
            let Some(top) = self.stack.last_mut() else {
                return None;
            };
            if top.next_child >= top.kids.len() {
                self.stack.pop();
                continue;
            }
            let (key, value) = top.kids[top.next_child];
            let index = top.next_child;
            let sibling_count = top.kids.len();
            top.next_child += 1;
            self.stack.push(StackFrame::new(NodeCtx {
                value,
                key,
                index,
                sibling_count,
            }));
            self.visit_current();
        }
    }

    /// Rebind the traversal to the same root. `bind(r); collect()` and
    /// `reset(); collect()` always return the same sequence.
    pub fn reset(&mut self) {
        self.restart();
    }

    /// Consume the handle, ending the traversal. Equivalent to dropping it,
    /// exposed for parity with the §4.6 operation table.
    pub fn release(self) {}

    pub(crate) fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.tracer = Tracer::new(verbosity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(query: &str, doc: &Value) -> Vec<Value> {
        let plan = crate::compile::compile(crate::parser::parse(query).unwrap());
        let mut handle = plan.bind(doc);
        let mut out = Vec::new();
        while let Some(v) = handle.next() {
            out.push(v.clone());
        }
        out
    }

    #[test]
    fn general_sibling_only_considers_earlier_siblings() {
        let doc = json!({"a": 1, "b": 2, "c": 3});
        // "number ~ number" should match every number after the first.
        assert_eq!(run("number ~ number", &doc), vec![json!(2), json!(3)]);
    }

    #[test]
    fn descendant_combinator_matches_any_depth() {
        let doc = json!({"outer": {"inner": {"deep": 1}}});
        assert_eq!(run("object number", &doc), vec![json!(1)]);
    }

    #[test]
    fn child_combinator_requires_immediate_parent() {
        let doc = json!({"outer": {"inner": {"deep": 1}}});
        assert!(run("object > number", &doc).is_empty());
        assert_eq!(run("object > object > number", &doc), vec![json!(1)]);
    }

    #[test]
    fn has_excludes_the_scope_root_itself() {
        let doc = json!({"a": {"b": 1}});
        assert!(run(":has(:root)", &doc).is_empty());
        assert_eq!(run(":has(number)", &doc), vec![doc.clone()]);
    }
}
