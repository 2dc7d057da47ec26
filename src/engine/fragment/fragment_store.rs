use super::Fragment;
use crate::engine::cache::{CacheStats, LoadingLru};
use crate::engine::errors::FragmentError;
use crate::engine::index::{Index, IndexEntry};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub const DEFAULT_MAX_FRAGMENTS: usize = 1000;

/// Random-access reader over one mapping file plus an LRU of the class
/// sections already read from it.
///
/// The file handle is the only state needing mutual exclusion: each
/// seek+read pair runs under its lock. Cache lookups never touch the file.
pub struct FragmentStore {
    mapping_path: PathBuf,
    index: Arc<Index>,
    file: Mutex<Option<File>>,
    closed: AtomicBool,
    fragments: LoadingLru<String, Fragment>,
}

impl FragmentStore {
    pub fn open(
        mapping_path: &Path,
        index: Arc<Index>,
        max_fragments: usize,
    ) -> Result<Self, FragmentError> {
        let file = File::open(mapping_path)?;
        debug!(
            target: "retrace::fragment",
            path = %mapping_path.display(),
            classes = index.len(),
            max_fragments,
            "Opened fragment store"
        );
        Ok(Self {
            mapping_path: mapping_path.to_path_buf(),
            index,
            file: Mutex::new(Some(file)),
            closed: AtomicBool::new(false),
            fragments: LoadingLru::new(max_fragments),
        })
    }

    pub fn mapping_path(&self) -> &Path {
        &self.mapping_path
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn contains(&self, obfuscated_name: &str) -> bool {
        self.index.contains(obfuscated_name)
    }

    pub fn all_obfuscated_names(&self) -> HashSet<String> {
        self.index.names().map(str::to_string).collect()
    }

    /// `Ok(None)` iff the class is not in the index.
    pub fn lookup(&self, obfuscated_name: &str) -> Result<Option<Fragment>, FragmentError> {
        let Some(entry) = self.index.get(obfuscated_name) else {
            return Ok(None);
        };
        if self.is_closed() {
            return Err(FragmentError::Closed);
        }
        let key = obfuscated_name.to_string();
        let (fragment, _) = self
            .fragments
            .get_or_load(&key, || self.read_fragment(entry))?;
        Ok(Some(fragment))
    }

    /// Concatenates the sections of every indexed name in `names`, in file
    /// order. Unknown names are skipped; no known names gives an empty
    /// document.
    pub fn minimal_document<S: AsRef<str>>(&self, names: &HashSet<S>) -> Result<String, FragmentError> {
        let mut entries: Vec<&IndexEntry> = names
            .iter()
            .filter_map(|name| self.index.get(name.as_ref()))
            .collect();
        entries.sort_by_key(|e| e.byte_offset);

        let capacity = entries.iter().map(|e| e.byte_length as usize + 1).sum();
        let mut document = String::with_capacity(capacity);
        for entry in entries {
            if let Some(fragment) = self.lookup(&entry.obfuscated_name)? {
                document.push_str(&fragment);
                if !document.ends_with('\n') {
                    document.push('\n');
                }
            }
        }
        Ok(document)
    }

    /// Releases the file handle and every cached fragment. Later reads fail
    /// with [`FragmentError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let closed = self.file.lock().take().is_some();
        self.fragments.clear();
        if closed {
            debug!(target: "retrace::fragment", path = %self.mapping_path.display(), "Closed fragment store");
        }
    }

    /// Never touches the file lock, so hits stay off the read path.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.fragments.stats()
    }

    #[cfg(test)]
    pub(crate) fn hold_file_lock(&self) -> parking_lot::MutexGuard<'_, Option<File>> {
        self.file.lock()
    }

    fn read_fragment(&self, entry: &IndexEntry) -> Result<Fragment, FragmentError> {
        let mut buf = vec![0u8; entry.byte_length as usize];
        {
            let mut guard = self.file.lock();
            let file = guard.as_mut().ok_or(FragmentError::Closed)?;
            file.seek(SeekFrom::Start(entry.byte_offset))?;
            file.read_exact(&mut buf)?;
        }
        let text = String::from_utf8(buf).map_err(|_| FragmentError::Utf8 {
            name: entry.obfuscated_name.clone(),
        })?;
        Ok(Fragment::new(text))
    }
}
