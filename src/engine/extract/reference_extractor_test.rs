use crate::engine::extract::ReferenceExtractor;
use crate::engine::index::{Index, IndexEntry};
use std::collections::{HashMap, HashSet};

fn index_of(names: &[&str]) -> Index {
    let mut entries = HashMap::new();
    for (i, name) in names.iter().enumerate() {
        entries.insert(
            name.to_string(),
            IndexEntry::new(*name, format!("orig.{}", i), i as u64 * 10, 10),
        );
    }
    Index::new(entries, names.len() as u64 * 10, 0)
}

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn stack_frame_drops_member_name() {
    let index = index_of(&["a.b.C"]);
    let found = ReferenceExtractor::extract(&["at a.b.C.method(File.java:42)"], &index);
    assert_eq!(found, set(&["a.b.C"]));
}

#[test]
fn caused_by_line() {
    let index = index_of(&["x.y.Z"]);
    let found = ReferenceExtractor::extract(&["Caused by: x.y.Z: oops"], &index);
    assert_eq!(found, set(&["x.y.Z"]));
}

#[test]
fn leading_exception_line() {
    let index = index_of(&["a.FooException"]);
    let found = ReferenceExtractor::extract(&["a.FooException: bad input"], &index);
    assert_eq!(found, set(&["a.FooException"]));
}

#[test]
fn nested_reference_adds_enclosing_class() {
    let index = index_of(&["a.b.Outer", "a.b.Outer$Inner"]);
    let found = ReferenceExtractor::extract(&["\tat a.b.Outer$Inner.a(SourceFile:1)"], &index);
    assert_eq!(found, set(&["a.b.Outer", "a.b.Outer$Inner"]));
}

#[test]
fn enclosing_classes_walk_outwards() {
    let outers: Vec<_> = ReferenceExtractor::enclosing_classes("a.b.Outer$Mid$Inner").collect();
    assert_eq!(outers, vec!["a.b.Outer$Mid", "a.b.Outer"]);

    let lambda: Vec<_> =
        ReferenceExtractor::enclosing_classes("a.b.C$$ExternalSyntheticLambda0").collect();
    assert_eq!(lambda, vec!["a.b.C"]);

    assert_eq!(ReferenceExtractor::enclosing_classes("a.b.C").count(), 0);
    assert_eq!(ReferenceExtractor::enclosing_classes("a.b.$Proxy1").count(), 0);
}

#[test]
fn fallback_catches_irregular_formats() {
    let index = index_of(&["k.l.M"]);
    let found = ReferenceExtractor::extract(&["E/AndroidRuntime: crashed in k.l.M during start"], &index);
    assert_eq!(found, set(&["k.l.M"]));
}

#[test]
fn unknown_candidates_are_filtered_by_index() {
    let index = index_of(&["a.b.C"]);
    let found = ReferenceExtractor::extract(
        &[
            "version 1.2.3 of com.vendor.lib",
            "at java.lang.Thread.run(Thread.java:919)",
        ],
        &index,
    );
    assert!(found.is_empty());

    let raw = ReferenceExtractor::candidates("at java.lang.Thread.run(Thread.java:919)");
    assert!(raw.contains("java.lang.Thread"));
}

#[test]
fn unparseable_lines_contribute_nothing() {
    let index = index_of(&["a.b.C"]);
    let lines = ["", "   ", "}}}((( ::", "\u{1F4A5} at (", "..."];
    assert!(ReferenceExtractor::extract(&lines, &index).is_empty());
}

#[test]
fn whole_trace_collects_union() {
    let index = index_of(&["a.b.C", "a.b.Outer", "a.b.Outer$Inner", "x.y.Z", "q.r.S"]);
    let trace = vec![
        "x.y.Z: something broke".to_string(),
        "    at a.b.C.b(SourceFile:2)".to_string(),
        "    at a.b.Outer$Inner.a(SourceFile:1)".to_string(),
        "    at android.os.Handler.dispatchMessage(Handler.java:106)".to_string(),
    ];
    let found = ReferenceExtractor::extract(&trace, &index);
    assert_eq!(found, set(&["a.b.C", "a.b.Outer", "a.b.Outer$Inner", "x.y.Z"]));
}

#[test]
fn overlong_fallback_tokens_are_ignored() {
    let long = format!("a.{}", "b".repeat(250));
    assert!(!ReferenceExtractor::candidates(&long).contains(&long));
}
