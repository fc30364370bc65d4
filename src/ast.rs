//! Parsed selector syntax tree.
//!
//! This is the parser's output and the compiler's input: a direct
//! structural mirror of the grammar, not yet partitioned or optimised for
//! evaluation (that happens in `compile`).

use ptree::TreeItem;
use std::borrow::Cow;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeAtom {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl TypeAtom {
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "object" => TypeAtom::Object,
            "array" => TypeAtom::Array,
            "string" => TypeAtom::String,
            "number" => TypeAtom::Number,
            "boolean" => TypeAtom::Boolean,
            "null" => TypeAtom::Null,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ExprOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Pseudo {
    Root,
    FirstChild,
    LastChild,
    NthChild(u32),
    NthLastChild(u32),
    OnlyChild,
    Empty,
    Val(Literal),
    Contains(String),
    Has(Group),
    Expr(ExprOp, Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Atom {
    Type(TypeAtom),
    Universal,
    Key(String),
    Pseudo(Pseudo),
}

/// A non-empty conjunction of atoms: all must hold of the same node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SimpleSelector {
    pub atoms: Vec<Atom>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
    Sibling,
}

/// A chain of simple selectors joined by combinators, read left to right;
/// the last segment is the subject that a match is yielded for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompoundSelector {
    pub segments: Vec<SimpleSelector>,
    pub combinators: Vec<Combinator>,
}

/// A selector group: a comma-separated union of compound selectors. A node
/// matches the group if it matches any one compound selector, and is
/// yielded once per compound it matches (no de-duplication across the
/// union).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Group {
    pub compounds: Vec<CompoundSelector>,
}

// --- ptree debug printing -------------------------------------------------
//
// Pure development tooling: lets an embedder print a parsed selector group
// to see how it was understood. Not part of evaluated semantics.

impl Group {
    pub fn print(&self) -> io::Result<()> {
        ptree::print_tree(&GroupItem(self.clone()))
    }
}

#[derive(Clone)]
struct GroupItem(Group);

#[derive(Clone)]
enum TreeNode {
    Compound(CompoundSelector),
    Simple(SimpleSelector),
    Leaf(String),
}

impl TreeItem for GroupItem {
    type Child = TreeNodeItem;

    fn write_self<W: io::Write>(&self, f: &mut W, style: &ptree::Style) -> io::Result<()> {
        write!(f, "{}", style.paint("selector group"))
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::Owned(
            self.0
                .compounds
                .iter()
                .cloned()
                .map(|c| TreeNodeItem(TreeNode::Compound(c)))
                .collect(),
        )
    }
}

#[derive(Clone)]
struct TreeNodeItem(TreeNode);

impl TreeItem for TreeNodeItem {
    type Child = TreeNodeItem;

    fn write_self<W: io::Write>(&self, f: &mut W, style: &ptree::Style) -> io::Result<()> {
        let label = match &self.0 {
            TreeNode::Compound(c) => format!("compound ({} segment(s))", c.segments.len()),
            TreeNode::Simple(s) => format!("simple ({} atom(s))", s.atoms.len()),
            TreeNode::Leaf(s) => s.clone(),
        };
        write!(f, "{}", style.paint(label))
    }

    fn children(&self) -> Cow<[Self::Child]> {
        match &self.0 {
            TreeNode::Compound(c) => Cow::Owned(
                c.segments
                    .iter()
                    .cloned()
                    .map(|s| TreeNodeItem(TreeNode::Simple(s)))
                    .collect(),
            ),
            TreeNode::Simple(s) => Cow::Owned(
                s.atoms
                    .iter()
                    .map(|a| TreeNodeItem(TreeNode::Leaf(describe_atom(a))))
                    .collect(),
            ),
            TreeNode::Leaf(_) => Cow::Borrowed(&[]),
        }
    }
}

fn describe_atom(atom: &Atom) -> String {
    match atom {
        Atom::Type(t) => format!("{:?}", t).to_lowercase(),
        Atom::Universal => "*".to_string(),
        Atom::Key(k) => format!(".{}", k),
        Atom::Pseudo(p) => format!(":{}", describe_pseudo(p)),
    }
}

fn describe_pseudo(pseudo: &Pseudo) -> String {
    match pseudo {
        Pseudo::Root => "root".to_string(),
        Pseudo::FirstChild => "first-child".to_string(),
        Pseudo::LastChild => "last-child".to_string(),
        Pseudo::NthChild(n) => format!("nth-child({})", n),
        Pseudo::NthLastChild(n) => format!("nth-last-child({})", n),
        Pseudo::OnlyChild => "only-child".to_string(),
        Pseudo::Empty => "empty".to_string(),
        Pseudo::Val(_) => "val(...)".to_string(),
        Pseudo::Contains(s) => format!("contains(\"{}\")", s),
        Pseudo::Has(_) => "has(...)".to_string(),
        Pseudo::Expr(_, _) => "expr(...)".to_string(),
    }
}
