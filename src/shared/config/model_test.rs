use crate::shared::config::model::{PartitionedConfig, load_settings};

#[test]
fn defaults_load_without_config_file() {
    // SAFETY: no other test in this crate reads or writes RETRACE_CONFIG.
    unsafe {
        std::env::set_var("RETRACE_CONFIG", "does/not/exist/retrace");
    }
    let settings = load_settings().expect("defaults");
    assert!(settings.partitioned.enabled);
    assert_eq!(settings.partitioned.threshold_mb, 50);
    assert_eq!(settings.partitioned.max_cached_fragments, 1000);
    assert!(settings.engine_cache.max_size >= settings.engine_cache.min_size);
}

#[test]
fn threshold_is_expressed_in_mebibytes() {
    let cfg = PartitionedConfig {
        enabled: true,
        threshold_mb: 50,
        max_cached_fragments: 10,
    };
    assert_eq!(cfg.threshold_bytes(), 50 * 1024 * 1024);
}
