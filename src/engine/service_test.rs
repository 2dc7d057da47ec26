use super::cache::EngineCacheConfig;
use super::resolve::EngineKind;
use super::service::RetraceService;
use super::types::VersionKey;
use crate::test_helpers::factories::mapping_file_factory::MappingFileFactory;
use std::path::Path;

fn service(root: &Path, threshold_bytes: u64) -> RetraceService {
    RetraceService::new(EngineCacheConfig {
        root_dir: root.to_path_buf(),
        min_size: 1,
        max_size: 1,
        partitioned_enabled: true,
        threshold_bytes,
        max_cached_fragments: 8,
    })
}

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

#[test]
fn resolves_through_cached_engine() {
    let tmp = tempfile::tempdir().unwrap();
    let key = VersionKey::new("app", "1.0", 1);
    MappingFileFactory::sample().write_version(tmp.path(), &key);
    let service = service(tmp.path(), 0);

    let resolution = service
        .resolve(&key, &lines(&["x.y.Z: oops", "    at a.b.C.onCreate(SourceFile:1)"]))
        .unwrap();

    assert!(resolution.resolved);
    assert_eq!(resolution.lines[0], "com.example.app.BadThingException: oops");
    assert_eq!(service.cached_versions(), vec![key.clone()]);
    assert_eq!(
        service.resolve_field(&key, "a.b.C", "a").unwrap().as_deref(),
        Some("label")
    );
    assert_eq!(
        service.resolve_type(&key, "x.y.Z[]").unwrap(),
        "com.example.app.BadThingException[]"
    );
}

#[test]
fn unknown_version_is_returned_unresolved() {
    let tmp = tempfile::tempdir().unwrap();
    let service = service(tmp.path(), 0);
    let input = lines(&["    at a.b.C.onCreate(SourceFile:1)"]);

    let resolution = service.resolve(&VersionKey::new("nope", "0", 0), &input).unwrap();

    assert_eq!(resolution.lines, input);
    assert!(!resolution.resolved);
    assert!(service.cached_versions().is_empty());
}

#[test]
fn evicted_engine_is_transparently_refetched() {
    let tmp = tempfile::tempdir().unwrap();
    let first = VersionKey::new("app", "1.0", 1);
    let second = VersionKey::new("app", "2.0", 2);
    MappingFileFactory::sample().write_version(tmp.path(), &first);
    MappingFileFactory::sample().write_version(tmp.path(), &second);
    let service = service(tmp.path(), 0);

    for _ in 0..3 {
        for key in [&first, &second] {
            let class = service.resolve_class(key, "a.b.C").unwrap();
            assert_eq!(class.as_deref(), Some("com.example.app.MainActivity"));
        }
    }
    assert_eq!(service.cache().stats().len, 1);
}

#[test]
fn upload_refreshes_engine() {
    let tmp = tempfile::tempdir().unwrap();
    let key = VersionKey::new("app", "1.0", 1);
    let service = service(tmp.path(), 1024 * 1024);

    assert_eq!(service.on_mapping_uploaded(&key).unwrap(), EngineKind::Empty);

    MappingFileFactory::sample().write_version(tmp.path(), &key);
    assert_eq!(service.on_mapping_uploaded(&key).unwrap(), EngineKind::FullLoad);
    let method = service
        .resolve_method(&key, "a.b.C", "onCreate", &[])
        .unwrap()
        .unwrap();
    assert_eq!(method.class, "com.example.app.MainActivity");
}

#[test]
fn ready_signal_prewarms() {
    let tmp = tempfile::tempdir().unwrap();
    let key = VersionKey::new("app", "1.0", 1);
    MappingFileFactory::sample().write_version(tmp.path(), &key);
    let service = service(tmp.path(), 0);

    let summary = service.on_application_ready();

    assert_eq!(summary.loaded, 1);
    assert!(service.cache().contains(&key));
    service.shutdown();
    assert!(!service.cache().contains(&key));
}
