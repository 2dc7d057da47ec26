use super::mapping_resolver::{MappingResolver, MethodName, ResolverFactory, remap_type, split_array_suffix};
use crate::engine::errors::FragmentError;
use crate::engine::extract::ReferenceExtractor;
use crate::engine::extract::reference_extractor::add_with_enclosing;
use crate::engine::fragment::FragmentStore;
use crate::engine::index::IndexBuilder;
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Serves one mapping file by reading only the class sections each request
/// references.
///
/// The index and fragment store are built on first use. Every call gets a
/// fresh resolver over a fresh minimal document; nothing parsed survives
/// between calls except the raw fragments in the store's LRU.
pub struct PartitionedLookupEngine {
    mapping_path: PathBuf,
    max_fragments: usize,
    factory: Arc<dyn ResolverFactory>,
    store: OnceCell<FragmentStore>,
    released: AtomicBool,
}

impl PartitionedLookupEngine {
    pub fn new(mapping_path: &Path, max_fragments: usize, factory: Arc<dyn ResolverFactory>) -> Self {
        Self {
            mapping_path: mapping_path.to_path_buf(),
            max_fragments,
            factory,
            store: OnceCell::new(),
            released: AtomicBool::new(false),
        }
    }

    pub fn mapping_path(&self) -> &Path {
        &self.mapping_path
    }

    /// The fragment store, once the first request has built it.
    pub fn store_if_open(&self) -> Option<&FragmentStore> {
        self.store.get()
    }

    pub fn resolve(&self, lines: &[String]) -> Result<Vec<String>, FragmentError> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        let store = self.store()?;
        let names = ReferenceExtractor::extract(lines, store.index());
        let resolver = self.scoped(store, &names)?;
        Ok(resolver.resolve_lines(lines))
    }

    pub fn resolve_class(&self, obfuscated: &str) -> Result<Option<String>, FragmentError> {
        let resolver = self.scoped_for(&[obfuscated])?;
        Ok(resolver.resolve_class(obfuscated))
    }

    /// `related_types` are declared parameter and return types; their
    /// sections are included so the resolver sees the whole signature.
    pub fn resolve_method(
        &self,
        class: &str,
        method: &str,
        related_types: &[&str],
    ) -> Result<Option<MethodName>, FragmentError> {
        let mut roots = vec![class];
        roots.extend_from_slice(related_types);
        let resolver = self.scoped_for(&roots)?;
        Ok(resolver.resolve_method(class, method))
    }

    pub fn resolve_field(&self, class: &str, field: &str) -> Result<Option<String>, FragmentError> {
        let resolver = self.scoped_for(&[class])?;
        Ok(resolver.resolve_field(class, field))
    }

    pub fn resolve_type(&self, ty: &str) -> Result<String, FragmentError> {
        let resolver = self.scoped_for(&[ty])?;
        Ok(remap_type(resolver.as_ref(), ty))
    }

    /// Closes the fragment store, if built, and refuses all later requests.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        if let Some(store) = self.store.get() {
            store.close();
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn store(&self) -> Result<&FragmentStore, FragmentError> {
        if self.is_released() {
            return Err(FragmentError::Closed);
        }
        let store = self.store.get_or_try_init(|| {
            let index = IndexBuilder::build(&self.mapping_path, false)?;
            FragmentStore::open(&self.mapping_path, Arc::new(index), self.max_fragments)
        })?;
        // A release racing with the first build must still close the store.
        if self.is_released() {
            store.close();
            return Err(FragmentError::Closed);
        }
        Ok(store)
    }

    /// Resolver over the sections of `roots` and all their enclosing classes.
    fn scoped_for(&self, roots: &[&str]) -> Result<Box<dyn MappingResolver>, FragmentError> {
        let store = self.store()?;
        let mut names = HashSet::new();
        for root in roots {
            let (base, _) = split_array_suffix(root);
            add_with_enclosing(&mut names, base);
        }
        names.retain(|name| store.contains(name));
        self.scoped(store, &names)
    }

    fn scoped(
        &self,
        store: &FragmentStore,
        names: &HashSet<String>,
    ) -> Result<Box<dyn MappingResolver>, FragmentError> {
        let document = store.minimal_document(names)?;
        debug!(
            target: "retrace::engine",
            path = %self.mapping_path.display(),
            classes = names.len(),
            bytes = document.len(),
            "Built minimal mapping document"
        );
        Ok(self.factory.scoped(Arc::from(document)))
    }
}
