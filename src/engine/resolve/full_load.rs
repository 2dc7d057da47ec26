use super::mapping_resolver::{MappingResolver, MethodName, ResolverFactory, remap_type};
use crate::engine::errors::EngineError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Parses the whole mapping file once and keeps the resolver for the
/// lifetime of the cache entry.
pub struct FullLoadEngine {
    mapping_path: PathBuf,
    resolver: Box<dyn MappingResolver>,
}

impl FullLoadEngine {
    pub fn load(mapping_path: &Path, factory: &dyn ResolverFactory) -> Result<Self, EngineError> {
        let start = Instant::now();
        let text: Arc<str> = Arc::from(fs::read_to_string(mapping_path)?);
        let bytes = text.len();
        let resolver = factory.scoped(text);
        info!(
            target: "retrace::engine",
            path = %mapping_path.display(),
            bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded full mapping"
        );
        Ok(Self {
            mapping_path: mapping_path.to_path_buf(),
            resolver,
        })
    }

    pub fn mapping_path(&self) -> &Path {
        &self.mapping_path
    }

    pub fn resolve(&self, lines: &[String]) -> Vec<String> {
        if lines.is_empty() {
            return Vec::new();
        }
        self.resolver.resolve_lines(lines)
    }

    pub fn resolve_class(&self, obfuscated: &str) -> Option<String> {
        self.resolver.resolve_class(obfuscated)
    }

    pub fn resolve_method(&self, class: &str, method: &str) -> Option<MethodName> {
        self.resolver.resolve_method(class, method)
    }

    pub fn resolve_field(&self, class: &str, field: &str) -> Option<String> {
        self.resolver.resolve_field(class, field)
    }

    pub fn resolve_type(&self, ty: &str) -> String {
        remap_type(self.resolver.as_ref(), ty)
    }
}
