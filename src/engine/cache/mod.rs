pub mod cache_stats;
pub mod discovery;
pub mod engine_cache;
pub mod engine_factory;
pub mod loading_lru;
pub mod prewarm;

pub use cache_stats::{CacheOutcome, CacheStats};
pub use discovery::discover_versions;
pub use engine_cache::EngineCache;
pub use engine_factory::{EngineCacheConfig, EngineFactory, MappingEngineFactory};
pub use loading_lru::{EvictionListener, LoadingLru};
pub use prewarm::{PrewarmSummary, plan_prewarm};

#[cfg(test)]
mod discovery_test;
#[cfg(test)]
mod prewarm_test;
