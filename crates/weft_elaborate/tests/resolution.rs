//! Resolution, caching and call folding through the full build pipeline.

use std::sync::Arc;
use weft_config::load_config_from_str;
use weft_elaborate::{elaborate_project, render_report, ElabError, Elaborated, Owner};

fn run(text: &str) -> Result<Elaborated, ElabError> {
    elaborate_project(&load_config_from_str(text).unwrap())
}

#[test]
fn instances_of_one_class_share_extraction() {
    let done = run(r#"
[project]
name = "cache"
top = "Top"

[components.Top]
children = [ { name = "leaves", class = "Leaf", count = 3 } ]

[components.Leaf]
signals = [ { name = "a", kind = "wire" }, { name = "b", kind = "wire" } ]
blocks = [ { name = "up", source = "s.b = s.a" } ]
"#)
    .unwrap();

    let cache = done.elaborator.cache();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.parse_count(), 1);

    let children = &done.design.components[done.root].children;
    assert_eq!(children.len(), 3);
    let bodies: Vec<_> = children
        .iter()
        .map(|&c| {
            let meta = done.elaborator.local_meta(c).unwrap();
            let (&owner, body) = meta.bodies.first().unwrap();
            assert!(matches!(owner, Owner::Block(_)));
            Arc::clone(body)
        })
        .collect();
    assert!(Arc::ptr_eq(&bodies[0], &bodies[1]));
    assert!(Arc::ptr_eq(&bodies[1], &bodies[2]));

    // Same text, different resolution per instance.
    let summary = done.elaborator.summary(&done.design).unwrap();
    assert_eq!(
        summary.block_writes["s.leaves[2].up"].iter().collect::<Vec<_>>(),
        vec!["s.leaves[2].b"]
    );
}

#[test]
fn wildcard_over_an_array_of_structs() {
    let done = run(r#"
[project]
name = "wildcard"
top = "Top"

[components.Top]
signals = [
  { name = "a", kind = "wire" },
  { name = "x", kind = "wire", fields = [ { name = "y" }, { name = "z" } ], count = 4 },
]
blocks = [ { name = "up", kind = "edge", source = "for i in range(4) {\n  s.x[i].y = s.a\n}" } ]
"#)
    .unwrap();

    let summary = done.elaborator.summary(&done.design).unwrap();
    let writes: Vec<&String> = summary.block_writes["s.up"].iter().collect();
    assert_eq!(
        writes,
        vec!["s.x[0].y", "s.x[1].y", "s.x[2].y", "s.x[3].y"]
    );
    assert!(summary.edge_blocks.contains("s.up"));
}

#[test]
fn constants_pick_one_element() {
    let done = run(r#"
[project]
name = "constants"
top = "Top"

[constants]
LAST = 3

[components.Top]
signals = [ { name = "x", kind = "wire", count = 4 }, { name = "y", kind = "wire" } ]
blocks = [ { name = "up", source = "s.y = s.x[LAST]" } ]
"#)
    .unwrap();
    let summary = done.elaborator.summary(&done.design).unwrap();
    assert_eq!(
        summary.block_reads["s.up"].iter().collect::<Vec<_>>(),
        vec!["s.x[3]"]
    );
}

const OUT_OF_RANGE: &str = r#"
[components.Top]
signals = [ { name = "x", kind = "wire", count = 4 }, { name = "y", kind = "wire" } ]
blocks = [ { name = "up", source = "s.y = s.x[7]" } ]
"#;

#[test]
fn out_of_range_index_selects_nothing() {
    let done = run(&format!(
        "[project]\nname = \"bounds\"\ntop = \"Top\"\n{OUT_OF_RANGE}"
    ))
    .unwrap();
    let summary = done.elaborator.summary(&done.design).unwrap();
    assert!(summary.block_reads["s.up"].is_empty());
}

#[test]
fn out_of_range_index_fails_when_strict() {
    let err = run(&format!(
        "[project]\nname = \"bounds\"\ntop = \"Top\"\n\n[elaborate]\nstrict_index_bounds = true\n{OUT_OF_RANGE}"
    ))
    .unwrap_err();
    match err {
        ElabError::UnresolvedReference { reference, owner, .. } => {
            assert_eq!(reference, "s.x[7]");
            assert_eq!(owner, "s.up");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_field_is_unresolved() {
    let err = run(r#"
[project]
name = "unresolved"
top = "Top"

[components.Top]
signals = [ { name = "y", kind = "wire" } ]
blocks = [ { name = "up", source = "s.y = s.nope" } ]
"#)
    .unwrap_err();
    assert!(matches!(err, ElabError::UnresolvedReference { .. }));
    assert!(err.to_string().contains("s.nope"), "{err}");
}

#[test]
fn syntax_errors_surface_with_a_location() {
    let err = run(r#"
[project]
name = "syntax"
top = "Top"

[components.Top]
blocks = [ { name = "up", source = "s.a = = 1" } ]
"#)
    .unwrap_err();
    assert!(matches!(err, ElabError::Syntax(_)));
    assert!(!err.to_diagnostic().labels.is_empty());
}

const CALLS: &str = r#"
[project]
name = "calls"
top = "Top"

[components.Top]
signals = [
  { name = "a", kind = "wire" },
  { name = "b", kind = "wire" },
  { name = "c", kind = "wire" },
  { name = "d", kind = "wire" },
]
funcs = [
  { name = "f", source = "s.b = s.a\nreturn g()" },
  { name = "g", source = "return h() + 1" },
  { name = "h", source = "s.d = s.c\nreturn s.d" },
]
blocks = [ { name = "up", source = "f()" } ]
"#;

#[test]
fn reachable_functions_fold_into_blocks() {
    let done = run(CALLS).unwrap();
    let summary = done.elaborator.summary(&done.design).unwrap();
    let set = |m: &std::collections::BTreeMap<String, std::collections::BTreeSet<String>>| {
        m["s.up"].iter().cloned().collect::<Vec<_>>()
    };
    assert_eq!(set(&summary.block_reads), vec!["s.a", "s.c", "s.d"]);
    assert_eq!(set(&summary.block_writes), vec!["s.b", "s.d"]);
    assert_eq!(set(&summary.block_calls), vec!["s.f", "s.g", "s.h"]);
}

#[test]
fn report_lists_functions_and_blocks() {
    let done = run(CALLS).unwrap();
    let text = render_report(&done.design, &done.elaborator).unwrap();
    assert!(text.starts_with("functions\n  s.f\n"), "{text}");
    assert!(text.contains("update blocks\n  s.up (comb)\n"), "{text}");
    assert!(text.contains("        call  s.h\n"), "{text}");
}

#[test]
fn summary_serializes_to_json() {
    let done = run(CALLS).unwrap();
    let summary = done.elaborator.summary(&done.design).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["block_calls"]["s.up"].as_array().unwrap().len(), 3);
    assert_eq!(json["components"][0], "s");
}
