use crate::engine::cache::{EngineCache, EngineCacheConfig, PrewarmSummary};
use crate::engine::errors::{EngineError, FragmentError};
use crate::engine::resolve::{EngineKind, LookupEngine, MethodName, Resolution};
use crate::engine::types::VersionKey;
use crate::shared::config::Settings;
use tracing::{debug, info};

/// Long-lived owner of the engine cache. Starts empty, fills through
/// [`on_application_ready`](Self::on_application_ready) and requests, and
/// releases every held file handle on [`shutdown`](Self::shutdown) or drop.
pub struct RetraceService {
    cache: EngineCache,
}

impl RetraceService {
    pub fn new(config: EngineCacheConfig) -> Self {
        Self::with_cache(EngineCache::new(config))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(EngineCacheConfig::from(settings))
    }

    pub fn with_cache(cache: EngineCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &EngineCache {
        &self.cache
    }

    pub fn on_application_ready(&self) -> PrewarmSummary {
        info!(target: "retrace::prewarm", root = %self.cache.config().root_dir.display(), "Application ready, pre-warming engines");
        self.cache.prewarm()
    }

    /// A new mapping for `key` replaces whatever engine served it before.
    pub fn on_mapping_uploaded(&self, key: &VersionKey) -> Result<EngineKind, EngineError> {
        self.cache.refresh(key).map(|engine| engine.kind())
    }

    pub fn resolve(&self, key: &VersionKey, lines: &[String]) -> Result<Resolution, EngineError> {
        self.with_engine(key, |engine| engine.resolve(lines))
    }

    pub fn resolve_class(&self, key: &VersionKey, obfuscated: &str) -> Result<Option<String>, EngineError> {
        self.with_engine(key, |engine| engine.resolve_class(obfuscated))
    }

    pub fn resolve_method(
        &self,
        key: &VersionKey,
        class: &str,
        method: &str,
        related_types: &[&str],
    ) -> Result<Option<MethodName>, EngineError> {
        self.with_engine(key, |engine| engine.resolve_method(class, method, related_types))
    }

    pub fn resolve_field(&self, key: &VersionKey, class: &str, field: &str) -> Result<Option<String>, EngineError> {
        self.with_engine(key, |engine| engine.resolve_field(class, field))
    }

    pub fn resolve_type(&self, key: &VersionKey, ty: &str) -> Result<String, EngineError> {
        self.with_engine(key, |engine| engine.resolve_type(ty))
    }

    pub fn cached_versions(&self) -> Vec<VersionKey> {
        self.cache.list_cached()
    }

    pub fn shutdown(&self) {
        self.cache.shutdown();
    }

    /// Runs `op` against the engine for `key`. An engine released between
    /// lookup and use (evicted or refreshed concurrently) is fetched again
    /// once.
    fn with_engine<T>(
        &self,
        key: &VersionKey,
        op: impl Fn(&LookupEngine) -> Result<T, FragmentError>,
    ) -> Result<T, EngineError> {
        let engine = self.cache.get(key)?;
        match op(&engine) {
            Err(FragmentError::Closed) => {
                debug!(target: "retrace::engine_cache", %key, "Engine released mid-request, retrying");
                let engine = self.cache.get(key)?;
                Ok(op(&engine)?)
            }
            other => Ok(other?),
        }
    }
}

impl Drop for RetraceService {
    fn drop(&mut self) {
        self.cache.shutdown();
    }
}
