use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data: DataConfig,
    pub engine_cache: EngineCacheSettings,
    pub partitioned: PartitionedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Root of the `{appId}/{versionName}/{versionCode}/mapping.txt` tree.
    pub root_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineCacheSettings {
    /// Versions per application materialized at startup.
    pub min_size: usize,
    /// Upper bound on cached engines across all applications.
    pub max_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartitionedConfig {
    pub enabled: bool,
    /// Mapping files strictly larger than this are served lazily.
    pub threshold_mb: u64,
    pub max_cached_fragments: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl PartitionedConfig {
    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_mb.saturating_mul(1024 * 1024)
    }
}

/// Defaults, then the optional file named by `RETRACE_CONFIG`, then
/// `RETRACE_<SECTION>__<KEY>` environment overrides.
pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("RETRACE_CONFIG").unwrap_or_else(|_| "config/retrace".to_string());

    let settings: Settings = config::Config::builder()
        .set_default("data.root_dir", "data/mappings")?
        .set_default("engine_cache.min_size", 1)?
        .set_default("engine_cache.max_size", 10)?
        .set_default("partitioned.enabled", true)?
        .set_default("partitioned.threshold_mb", 50)?
        .set_default("partitioned.max_cached_fragments", 1000)?
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(
            config::Environment::with_prefix("RETRACE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
