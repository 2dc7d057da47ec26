use super::discovery::discover_versions;
use super::engine_factory::{EngineCacheConfig, EngineFactory, MappingEngineFactory};
use super::prewarm::{PrewarmSummary, plan_prewarm};
use super::{CacheStats, LoadingLru};
use crate::engine::errors::EngineError;
use crate::engine::resolve::LookupEngine;
use crate::engine::types::VersionKey;
use crate::shared::path::mapping_path;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-version cache of lookup engines.
///
/// Bounded by `max_size` entries with strict LRU eviction. Each engine is
/// built at most once per residency, even under concurrent first access, and
/// every engine that leaves the cache is released before its slot is reused.
/// Versions without a mapping get a shared [`LookupEngine::Empty`] that is
/// never cached.
pub struct EngineCache {
    config: EngineCacheConfig,
    factory: Arc<dyn EngineFactory>,
    engines: LoadingLru<VersionKey, Arc<LookupEngine>>,
    empty: Arc<LookupEngine>,
    constructions: AtomicU64,
}

impl EngineCache {
    pub fn new(config: EngineCacheConfig) -> Self {
        let factory = Arc::new(MappingEngineFactory::new(config.clone()));
        Self::with_factory(config, factory)
    }

    pub fn with_factory(config: EngineCacheConfig, factory: Arc<dyn EngineFactory>) -> Self {
        let engines = LoadingLru::new(config.max_size).with_eviction_listener(
            |key: &VersionKey, engine: &Arc<LookupEngine>| {
                debug!(target: "retrace::engine_cache", %key, kind = ?engine.kind(), "Releasing engine");
                engine.release();
            },
        );
        Self {
            config,
            factory,
            engines,
            empty: Arc::new(LookupEngine::Empty),
            constructions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineCacheConfig {
        &self.config
    }

    /// Returns the cached engine for `key`, building it on first access.
    pub fn get(&self, key: &VersionKey) -> Result<Arc<LookupEngine>, EngineError> {
        let loaded = self
            .engines
            .get_or_load(key, || self.construct(key))
            .map(|(engine, _)| engine);
        self.or_empty(loaded)
    }

    /// Drops the cached engine for `key` and builds its replacement now.
    pub fn refresh(&self, key: &VersionKey) -> Result<Arc<LookupEngine>, EngineError> {
        info!(target: "retrace::engine_cache", %key, "Refreshing engine");
        let loaded = self
            .engines
            .reload(key, || self.construct(key))
            .map(|(engine, _)| engine);
        self.or_empty(loaded)
    }

    /// Evicts and releases the engine for `key`. Returns whether one was cached.
    pub fn invalidate(&self, key: &VersionKey) -> bool {
        self.engines.invalidate(key).is_some()
    }

    /// Cached versions whose mapping file is still on disk, most recent first
    /// within each application.
    pub fn list_cached(&self) -> Vec<VersionKey> {
        let mut keys: Vec<VersionKey> = self
            .engines
            .keys()
            .into_iter()
            .filter(|key| mapping_path(&self.config.root_dir, key).is_file())
            .collect();
        keys.sort_by(|a, b| a.app_id.cmp(&b.app_id).then_with(|| a.recency_cmp(b)));
        keys
    }

    pub fn contains(&self, key: &VersionKey) -> bool {
        self.engines.contains(key)
    }

    /// Materializes the most recent versions of every application found on
    /// disk. One version failing never stops the others.
    pub fn prewarm(&self) -> PrewarmSummary {
        let start = Instant::now();
        let discovered = match discover_versions(&self.config.root_dir) {
            Ok(versions) => versions,
            Err(e) => {
                warn!(target: "retrace::prewarm", root = %self.config.root_dir.display(), error = %e, "Version discovery failed");
                return PrewarmSummary::default();
            }
        };
        let plan = plan_prewarm(&discovered, self.config.min_size, self.config.max_size);

        let failed: Vec<VersionKey> = plan
            .par_iter()
            .filter_map(|key| match self.engines.get_or_load(key, || self.construct(key)) {
                Ok(_) => None,
                Err(e) => {
                    warn!(target: "retrace::prewarm", %key, error = %e, "Pre-warm failed");
                    Some(key.clone())
                }
            })
            .collect();

        let summary = PrewarmSummary {
            discovered: discovered.len(),
            planned: plan.len(),
            loaded: plan.len() - failed.len(),
            failed,
        };
        info!(
            target: "retrace::prewarm",
            discovered = summary.discovered,
            planned = summary.planned,
            loaded = summary.loaded,
            failed = summary.failed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pre-warm finished"
        );
        summary
    }

    /// Engines built since this cache was created.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        self.engines.stats()
    }

    /// Evicts and releases every engine.
    pub fn shutdown(&self) {
        let stats = self.engines.stats();
        self.engines.clear();
        info!(
            target: "retrace::engine_cache",
            released = stats.len,
            hit_ratio = stats.hit_ratio(),
            evictions = stats.evictions,
            "Engine cache shut down"
        );
    }

    fn construct(&self, key: &VersionKey) -> Result<Arc<LookupEngine>, EngineError> {
        let engine = self.factory.create(key)?;
        self.constructions.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(engine))
    }

    fn or_empty(
        &self,
        loaded: Result<Arc<LookupEngine>, EngineError>,
    ) -> Result<Arc<LookupEngine>, EngineError> {
        match loaded {
            Ok(engine) => Ok(engine),
            Err(e @ EngineError::NotFound { .. }) => {
                e.log_error();
                Ok(Arc::clone(&self.empty))
            }
            Err(e) => {
                e.log_error();
                Err(e)
            }
        }
    }
}
