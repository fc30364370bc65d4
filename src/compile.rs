//! Compiles a parsed [`ast::Group`] into a [`Plan`]: atoms partitioned into
//! type test / key test / pseudo-classes (cheapest first, per §4.4), with
//! `:has(...)` sub-groups compiled recursively into their own sub-plans.

use crate::ast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeTest {
    Any,
    One(ast::TypeAtom),
    /// Two distinct type atoms stacked on one simple selector (e.g. a
    /// hypothetical `object array`): no node can ever be both, so this
    /// never matches.
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyTest {
    Any,
    One(String),
    /// Two distinct key atoms stacked on one simple selector (`.a.b`): a
    /// node sits under exactly one key in its parent, so demanding two
    /// different keys can never be satisfied. Treated as a no-match rather
    /// than a parse error, per the grammar's design notes.
    Impossible,
}

#[derive(Debug, Clone)]
pub(crate) enum CompiledPseudo {
    Root,
    FirstChild,
    LastChild,
    NthChild(u32),
    NthLastChild(u32),
    OnlyChild,
    Empty,
    Val(ast::Literal),
    Contains(String),
    Has(Box<Plan>),
    Expr(ast::ExprOp, ast::Literal),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledSimple {
    pub type_test: TypeTest,
    pub key_test: KeyTest,
    pub pseudos: Vec<CompiledPseudo>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledCompound {
    /// Segments read left to right; `segments.last()` is the subject.
    pub segments: Vec<CompiledSimple>,
    /// `combinators[i]` relates `segments[i]` to `segments[i + 1]`.
    pub combinators: Vec<ast::Combinator>,
}

/// Immutable compiled form of a parsed selector group. Plans hold no
/// borrows into any DOM and may be shared by reference across handles.
#[derive(Debug, Clone)]
pub struct Plan {
    pub(crate) compounds: Vec<CompiledCompound>,
}

fn compile_type_atoms(atoms: &[ast::TypeAtom]) -> TypeTest {
    match atoms.first() {
        None => TypeTest::Any,
        Some(first) => {
            if atoms.iter().all(|t| t == first) {
                TypeTest::One(*first)
            } else {
                TypeTest::Impossible
            }
        }
    }
}

fn compile_key_atoms(keys: &[String]) -> KeyTest {
    match keys.first() {
        None => KeyTest::Any,
        Some(first) => {
            if keys.iter().all(|k| k == first) {
                KeyTest::One(first.clone())
            } else {
                KeyTest::Impossible
            }
        }
    }
}

fn compile_pseudo(pseudo: ast::Pseudo) -> CompiledPseudo {
    match pseudo {
        ast::Pseudo::Root => CompiledPseudo::Root,
        ast::Pseudo::FirstChild => CompiledPseudo::FirstChild,
        ast::Pseudo::LastChild => CompiledPseudo::LastChild,
        ast::Pseudo::NthChild(n) => CompiledPseudo::NthChild(n),
        ast::Pseudo::NthLastChild(n) => CompiledPseudo::NthLastChild(n),
        ast::Pseudo::OnlyChild => CompiledPseudo::OnlyChild,
        ast::Pseudo::Empty => CompiledPseudo::Empty,
        ast::Pseudo::Val(lit) => CompiledPseudo::Val(lit),
        ast::Pseudo::Contains(s) => CompiledPseudo::Contains(s),
        ast::Pseudo::Has(group) => CompiledPseudo::Has(Box::new(compile(group))),
        ast::Pseudo::Expr(op, lit) => CompiledPseudo::Expr(op, lit),
    }
}

fn compile_simple(simple: ast::SimpleSelector) -> CompiledSimple {
    let mut type_atoms = Vec::new();
    let mut keys = Vec::new();
    let mut pseudos = Vec::new();
    for atom in simple.atoms {
        match atom {
            ast::Atom::Type(t) => type_atoms.push(t),
            ast::Atom::Universal => {}
            ast::Atom::Key(k) => keys.push(k),
            ast::Atom::Pseudo(p) => pseudos.push(compile_pseudo(p)),
        }
    }
    CompiledSimple {
        type_test: compile_type_atoms(&type_atoms),
        key_test: compile_key_atoms(&keys),
        pseudos,
    }
}

fn compile_compound(compound: ast::CompoundSelector) -> CompiledCompound {
    CompiledCompound {
        segments: compound.segments.into_iter().map(compile_simple).collect(),
        combinators: compound.combinators,
    }
}

pub(crate) fn compile(group: ast::Group) -> Plan {
    Plan {
        compounds: group.compounds.into_iter().map(compile_compound).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_atom_compiles_to_one() {
        let group = crate::parser::parse(".a").unwrap();
        let plan = compile(group);
        assert!(matches!(
            &plan.compounds[0].segments[0].key_test,
            KeyTest::One(k) if k == "a"
        ));
    }

    #[test]
    fn stacked_distinct_keys_are_impossible() {
        let group = crate::parser::parse(".a.b").unwrap();
        let plan = compile(group);
        assert_eq!(plan.compounds[0].segments[0].key_test, KeyTest::Impossible);
    }

    #[test]
    fn repeated_identical_key_is_not_impossible() {
        let group = crate::parser::parse(".a.a").unwrap();
        let plan = compile(group);
        assert!(matches!(
            &plan.compounds[0].segments[0].key_test,
            KeyTest::One(k) if k == "a"
        ));
    }

    #[test]
    fn has_pseudo_compiles_to_boxed_sub_plan() {
        let group = crate::parser::parse(":has(.a)").unwrap();
        let plan = compile(group);
        assert!(matches!(
            plan.compounds[0].segments[0].pseudos.as_slice(),
            [CompiledPseudo::Has(_)]
        ));
    }
}
