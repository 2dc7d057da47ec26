use super::full_load::FullLoadEngine;
use super::mapping_resolver::MethodName;
use super::partitioned::PartitionedLookupEngine;
use crate::engine::errors::FragmentError;
use serde::Serialize;

/// Which engine variant serves a cache entry. Chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    FullLoad,
    Partitioned,
    Empty,
}

impl EngineKind {
    /// Files strictly larger than `threshold_bytes` are served partitioned
    /// when partitioned mode is enabled.
    pub fn select(file_size: u64, threshold_bytes: u64, partitioned_enabled: bool) -> Self {
        if partitioned_enabled && file_size > threshold_bytes {
            EngineKind::Partitioned
        } else {
            EngineKind::FullLoad
        }
    }
}

/// Output of one resolve call. `resolved` is false when no mapping backed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub lines: Vec<String>,
    pub resolved: bool,
}

impl Resolution {
    pub fn unresolved(lines: &[String]) -> Self {
        Self {
            lines: lines.to_vec(),
            resolved: false,
        }
    }
}

/// Lookup capability for one application version.
pub enum LookupEngine {
    FullLoad(FullLoadEngine),
    Partitioned(PartitionedLookupEngine),
    /// No mapping on disk: every name resolves to itself.
    Empty,
}

impl LookupEngine {
    pub fn kind(&self) -> EngineKind {
        match self {
            LookupEngine::FullLoad(_) => EngineKind::FullLoad,
            LookupEngine::Partitioned(_) => EngineKind::Partitioned,
            LookupEngine::Empty => EngineKind::Empty,
        }
    }

    pub fn resolve(&self, lines: &[String]) -> Result<Resolution, FragmentError> {
        match self {
            LookupEngine::FullLoad(engine) => Ok(Resolution {
                lines: engine.resolve(lines),
                resolved: true,
            }),
            LookupEngine::Partitioned(engine) => Ok(Resolution {
                lines: engine.resolve(lines)?,
                resolved: true,
            }),
            LookupEngine::Empty => Ok(Resolution::unresolved(lines)),
        }
    }

    pub fn resolve_class(&self, obfuscated: &str) -> Result<Option<String>, FragmentError> {
        match self {
            LookupEngine::FullLoad(engine) => Ok(engine.resolve_class(obfuscated)),
            LookupEngine::Partitioned(engine) => engine.resolve_class(obfuscated),
            LookupEngine::Empty => Ok(None),
        }
    }

    pub fn resolve_method(
        &self,
        class: &str,
        method: &str,
        related_types: &[&str],
    ) -> Result<Option<MethodName>, FragmentError> {
        match self {
            LookupEngine::FullLoad(engine) => Ok(engine.resolve_method(class, method)),
            LookupEngine::Partitioned(engine) => engine.resolve_method(class, method, related_types),
            LookupEngine::Empty => Ok(None),
        }
    }

    pub fn resolve_field(&self, class: &str, field: &str) -> Result<Option<String>, FragmentError> {
        match self {
            LookupEngine::FullLoad(engine) => Ok(engine.resolve_field(class, field)),
            LookupEngine::Partitioned(engine) => engine.resolve_field(class, field),
            LookupEngine::Empty => Ok(None),
        }
    }

    pub fn resolve_type(&self, ty: &str) -> Result<String, FragmentError> {
        match self {
            LookupEngine::FullLoad(engine) => Ok(engine.resolve_type(ty)),
            LookupEngine::Partitioned(engine) => engine.resolve_type(ty),
            LookupEngine::Empty => Ok(ty.trim().to_string()),
        }
    }

    /// Closes any file handle the engine holds. Later partitioned lookups
    /// fail with [`FragmentError::Closed`].
    pub fn release(&self) {
        if let LookupEngine::Partitioned(engine) = self {
            engine.release();
        }
    }
}

impl std::fmt::Debug for LookupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupEngine::FullLoad(engine) => f
                .debug_tuple("FullLoad")
                .field(&engine.mapping_path())
                .finish(),
            LookupEngine::Partitioned(engine) => f
                .debug_tuple("Partitioned")
                .field(&engine.mapping_path())
                .finish(),
            LookupEngine::Empty => f.write_str("Empty"),
        }
    }
}
