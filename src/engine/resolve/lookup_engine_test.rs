use super::full_load::FullLoadEngine;
use super::lookup_engine::{EngineKind, LookupEngine};
use super::mapping_resolver::ProguardResolverFactory;
use super::partitioned::PartitionedLookupEngine;
use crate::test_helpers::factories::mapping_file_factory::MappingFileFactory;
use std::sync::Arc;

const MB: u64 = 1024 * 1024;

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

#[test]
fn kind_follows_size_threshold() {
    assert_eq!(EngineKind::select(40 * MB, 50 * MB, true), EngineKind::FullLoad);
    assert_eq!(EngineKind::select(60 * MB, 50 * MB, true), EngineKind::Partitioned);
    assert_eq!(EngineKind::select(50 * MB, 50 * MB, true), EngineKind::FullLoad);
    assert_eq!(EngineKind::select(60 * MB, 50 * MB, false), EngineKind::FullLoad);
}

#[test]
fn empty_engine_echoes_input_unresolved() {
    let engine = LookupEngine::Empty;
    let input = lines(&["    at a.b.C.onCreate(SourceFile:1)"]);

    let resolution = engine.resolve(&input).unwrap();
    assert_eq!(resolution.lines, input);
    assert!(!resolution.resolved);
    assert_eq!(engine.resolve_class("a.b.C").unwrap(), None);
    assert_eq!(engine.resolve_type("a.b.C[]").unwrap(), "a.b.C[]");
    assert_eq!(engine.kind(), EngineKind::Empty);
}

#[test]
fn both_variants_resolve_the_same() {
    let tmp = tempfile::tempdir().unwrap();
    let mapping = MappingFileFactory::sample().write_to(&tmp.path().join("mapping.txt"));

    let full = LookupEngine::FullLoad(FullLoadEngine::load(&mapping, &ProguardResolverFactory).unwrap());
    let partitioned = LookupEngine::Partitioned(PartitionedLookupEngine::new(
        &mapping,
        10,
        Arc::new(ProguardResolverFactory),
    ));

    let input = lines(&[
        "x.y.Z: oops",
        "    at a.b.C.b(SourceFile:2)",
        "    at a.b.Outer$Inner.a(SourceFile:1)",
    ]);
    let a = full.resolve(&input).unwrap();
    let b = partitioned.resolve(&input).unwrap();

    assert!(a.resolved && b.resolved);
    assert_eq!(a.lines, b.lines);
    assert!(a.lines.len() > input.len());
    assert_eq!(
        full.resolve_field("a.b.C", "a").unwrap(),
        partitioned.resolve_field("a.b.C", "a").unwrap()
    );
}

#[test]
fn release_only_affects_partitioned() {
    let tmp = tempfile::tempdir().unwrap();
    let mapping = MappingFileFactory::sample().write_to(&tmp.path().join("mapping.txt"));

    let full = LookupEngine::FullLoad(FullLoadEngine::load(&mapping, &ProguardResolverFactory).unwrap());
    full.release();
    assert!(full.resolve(&lines(&["x.y.Z: oops"])).is_ok());

    let partitioned = LookupEngine::Partitioned(PartitionedLookupEngine::new(
        &mapping,
        10,
        Arc::new(ProguardResolverFactory),
    ));
    partitioned.release();
    assert!(partitioned.resolve(&lines(&["x.y.Z: oops"])).is_err());
}

#[test]
fn full_load_of_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(FullLoadEngine::load(&tmp.path().join("nope.txt"), &ProguardResolverFactory).is_err());
}
