pub mod full_load;
pub mod lookup_engine;
pub mod mapping_resolver;
pub mod partitioned;

pub use full_load::FullLoadEngine;
pub use lookup_engine::{EngineKind, LookupEngine, Resolution};
pub use mapping_resolver::{
    MappingResolver, MethodName, ProguardResolver, ProguardResolverFactory, ResolverFactory,
};
pub use partitioned::PartitionedLookupEngine;

#[cfg(test)]
mod lookup_engine_test;
