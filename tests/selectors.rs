//! End-to-end selector scenarios exercising the public API surface
//! (`parse`/`bind`/`next`) across module boundaries, kept as free-standing
//! integration tests separate from the unit tests beside each module.

use serde_json::json;

fn values(doc: &serde_json::Value, query: &str) -> Vec<serde_json::Value> {
    let plan = jsel::parse(query).unwrap();
    jsel::all(&plan, doc).into_iter().cloned().collect()
}

fn or_selector_doc() -> serde_json::Value {
    json!({
        "enum": 3,
        "ebool": true,
        "estr": "str",
        "enull": null,
        "eobj": {"ch1": 5, "ch2": false},
        "earray": [6, "brdm"],
    })
}

#[test]
fn scenario_universal_yields_all_nodes_root_first() {
    let doc = or_selector_doc();
    let matches = values(&doc, "*");
    assert_eq!(matches.len(), 11);
    assert_eq!(matches[0], doc);
}

#[test]
fn scenario_root_yields_only_the_document() {
    let doc = or_selector_doc();
    assert_eq!(values(&doc, ":root"), vec![doc]);
}

#[test]
fn scenario_disjunction_is_union_in_document_order() {
    let doc = or_selector_doc();
    assert_eq!(
        values(&doc, "boolean, null"),
        vec![json!(true), json!(null), json!(false)]
    );
}

#[test]
fn scenario_number_string_union() {
    let doc = or_selector_doc();
    assert_eq!(
        values(&doc, "number, string"),
        vec![json!(3), json!("str"), json!(5), json!(6), json!("brdm")]
    );
}

#[test]
fn scenario_child_combinator_scopes_to_one_parent() {
    let doc = or_selector_doc();
    assert_eq!(values(&doc, ".eobj > number"), vec![json!(5)]);
}

#[test]
fn scenario_contains_matches_substring() {
    let doc = json!({"estr": "str"});
    assert_eq!(values(&doc, ":contains(\"t\")"), vec![json!("str")]);
}

#[test]
fn scenario_sibling_combinator_finds_later_sibling() {
    let doc = json!({
        "ebool1": false,
        "ebool2": true,
        "estr": "str",
        "estr2": "str2",
        "eobj": {"ch1": null, "ch2": false},
        "earray": [6, "brdm"],
    });
    assert_eq!(values(&doc, "null ~ boolean"), vec![json!(false)]);
}

#[test]
fn scenario_descendant_val_on_array_of_objects() {
    let doc = json!({"strings": [{"data": "yes"}, {"data": "no"}]});
    assert_eq!(values(&doc, ".strings .data:val(\"yes\")"), vec![json!("yes")]);
}

#[test]
fn scenario_invalid_symbol_is_lex_error() {
    let err = jsel::parse("#").unwrap_err();
    assert_eq!(
        err.message(),
        "Syntax error. Unexpected symbol '#' in the query string"
    );
}

#[test]
fn scenario_trailing_whitespace_is_unexpected_end() {
    let err = jsel::parse(".key ").unwrap_err();
    assert_eq!(
        err.message(),
        "Syntax error. Unexpected end of the query string"
    );
}

#[test]
fn type_atoms_partition_scalars() {
    let doc = or_selector_doc();
    let mut seen: Vec<serde_json::Value> = Vec::new();
    for ty in ["object", "array", "string", "number", "boolean", "null"] {
        seen.extend(values(&doc, ty));
    }
    // Every node in the document is exactly one of the six types.
    assert_eq!(seen.len(), values(&doc, "*").len());
}

#[test]
fn permissive_evaluation_on_type_mismatch() {
    let doc = or_selector_doc();
    assert!(values(&doc, ".enum:val(\"not a number\")").is_empty());
    assert!(values(&doc, ".estr:expr(x<5)").is_empty());
}

#[test]
fn rebinding_is_idempotent() {
    let doc = or_selector_doc();
    let plan = jsel::parse("number, string").unwrap();
    let first_run = jsel::all(&plan, &doc);
    let mut handle = plan.bind(&doc);
    handle.next();
    handle.reset();
    let second_run: Vec<_> = std::iter::from_fn(|| handle.next()).collect();
    assert_eq!(first_run, second_run);
}

#[test]
fn has_pseudo_requires_strict_descendant() {
    let doc = json!({"a": {"b": 1}});
    // the scope root of :has is excluded from matching against its own predicate
    assert!(values(&doc, ":has(:root)").is_empty());
    assert_eq!(values(&doc, ":has(number)"), vec![doc.clone()]);
}

#[test]
fn nth_child_and_nth_last_child_are_one_based() {
    let doc = json!({"a": 1, "b": 2, "c": 3});
    assert_eq!(values(&doc, ":nth-child(2)"), vec![json!(2)]);
    assert_eq!(values(&doc, ":nth-last-child(1)"), vec![json!(3)]);
}

#[test]
fn stacked_key_atoms_never_match() {
    let doc = json!({"a": {"x": 1}});
    assert!(values(&doc, ".a.b > number").is_empty());
}

#[test]
fn group_separator_tolerates_trailing_space_before_comma() {
    let doc = json!({"a": true, "b": null});
    // space before the comma in "boolean , null" is not itself mistaken
    // for an announced descendant combinator.
    let plan = jsel::parse("boolean , null");
    assert!(plan.is_ok());
}
