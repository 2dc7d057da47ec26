pub mod global;
pub mod model;

pub use global::CONFIG;
pub use model::{
    DataConfig, EngineCacheSettings, LoggingConfig, PartitionedConfig, Settings, load_settings,
};

#[cfg(test)]
mod model_test;
