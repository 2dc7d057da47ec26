use crate::engine::errors::EngineError;
use crate::engine::resolve::{
    EngineKind, FullLoadEngine, LookupEngine, PartitionedLookupEngine, ProguardResolverFactory,
    ResolverFactory,
};
use crate::engine::types::VersionKey;
use crate::shared::config::Settings;
use crate::shared::path::{absolutize, mapping_path};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Runtime knobs of the engine cache, derived from [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCacheConfig {
    pub root_dir: PathBuf,
    pub min_size: usize,
    pub max_size: usize,
    pub partitioned_enabled: bool,
    pub threshold_bytes: u64,
    pub max_cached_fragments: usize,
}

impl From<&Settings> for EngineCacheConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            root_dir: absolutize(&settings.data.root_dir),
            min_size: settings.engine_cache.min_size,
            max_size: settings.engine_cache.max_size,
            partitioned_enabled: settings.partitioned.enabled,
            threshold_bytes: settings.partitioned.threshold_bytes(),
            max_cached_fragments: settings.partitioned.max_cached_fragments,
        }
    }
}

/// Builds the engine for one version on a cache miss.
pub trait EngineFactory: Send + Sync {
    fn create(&self, key: &VersionKey) -> Result<LookupEngine, EngineError>;
}

/// Reads mappings from the `{root}/{app}/{name}/{code}/mapping.txt` layout
/// and picks the engine variant from the file size.
pub struct MappingEngineFactory {
    config: EngineCacheConfig,
    resolvers: Arc<dyn ResolverFactory>,
}

impl MappingEngineFactory {
    pub fn new(config: EngineCacheConfig) -> Self {
        Self::with_resolvers(config, Arc::new(ProguardResolverFactory))
    }

    pub fn with_resolvers(config: EngineCacheConfig, resolvers: Arc<dyn ResolverFactory>) -> Self {
        Self { config, resolvers }
    }

    pub fn config(&self) -> &EngineCacheConfig {
        &self.config
    }
}

impl EngineFactory for MappingEngineFactory {
    fn create(&self, key: &VersionKey) -> Result<LookupEngine, EngineError> {
        let path = mapping_path(&self.config.root_dir, key);
        let size = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return Err(EngineError::NotFound { key: key.clone() }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EngineError::NotFound { key: key.clone() });
            }
            Err(e) => return Err(e.into()),
        };

        let kind = EngineKind::select(
            size,
            self.config.threshold_bytes,
            self.config.partitioned_enabled,
        );
        info!(
            target: "retrace::engine_cache",
            %key,
            bytes = size,
            kind = ?kind,
            "Creating lookup engine"
        );

        match kind {
            EngineKind::Partitioned => Ok(LookupEngine::Partitioned(PartitionedLookupEngine::new(
                &path,
                self.config.max_cached_fragments,
                Arc::clone(&self.resolvers),
            ))),
            _ => Ok(LookupEngine::FullLoad(FullLoadEngine::load(
                &path,
                self.resolvers.as_ref(),
            )?)),
        }
    }
}
