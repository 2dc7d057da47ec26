use crate::engine::types::VersionKey;
use crate::test_helpers::factory::Factory;

#[test]
fn test_mapping_file_factory() {
    let text = Factory::mapping_file()
        .with_comment("compiler: R8")
        .with_class("com.example.Foo", "a.a")
        .with_member("int count -> a")
        .with_blank_line()
        .text();

    assert_eq!(text, "# compiler: R8\ncom.example.Foo -> a.a:\n    int count -> a\n\n");
}

#[test]
fn test_write_version_uses_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let key = VersionKey::new("app", "1.0", 7);

    let path = Factory::sample_mapping().write_version(tmp.path(), &key);

    assert_eq!(path, tmp.path().join("app/1.0/7/mapping.txt"));
    assert!(std::fs::read_to_string(path).unwrap().contains("-> a.b.Outer$Inner:"));
}
