use super::discovery::discover_versions;
use crate::engine::types::VersionKey;
use crate::test_helpers::factories::mapping_file_factory::MappingFileFactory;
use std::fs;

#[test]
fn finds_versions_with_mapping_files() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let keys = [
        VersionKey::new("beta", "2.0", 20),
        VersionKey::new("alpha", "1.0", 10),
        VersionKey::new("alpha", "1.1", 11),
    ];
    for key in &keys {
        MappingFileFactory::sample().write_version(root, key);
    }
    fs::create_dir_all(root.join("alpha/1.2/not-a-number")).unwrap();
    fs::write(root.join("alpha/1.2/not-a-number/mapping.txt"), "x -> y:\n").unwrap();
    fs::create_dir_all(root.join("alpha/1.3/13")).unwrap();
    fs::write(root.join("stray.txt"), "").unwrap();

    let found = discover_versions(root).unwrap();

    assert_eq!(
        found,
        vec![
            VersionKey::new("alpha", "1.1", 11),
            VersionKey::new("alpha", "1.0", 10),
            VersionKey::new("beta", "2.0", 20),
        ]
    );
}

#[test]
fn missing_root_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(discover_versions(&tmp.path().join("nothing")).unwrap().is_empty());
}
