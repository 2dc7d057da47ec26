use crate::engine::errors::IndexError;
use crate::engine::index::IndexEntry;
use crate::shared::path::file_identity;
use crate::shared::storage_header::{BinaryHeader, FileKind, MagicFile};
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, error};

/// Byte-offset table of every class section in one mapping file, stamped with
/// the identity of the file it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: HashMap<String, IndexEntry>,
    source_file_size: u64,
    source_file_mtime: u64,
}

impl MagicFile for Index {
    const MAGIC: [u8; 4] = FileKind::MappingIndex.magic();
    const VERSION: u32 = 1;
}

/// Smallest possible serialized entry: two empty strings, offset and length.
const MIN_ENTRY_LEN: usize = 4 + 4 + 8 + 4;

struct IndexReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> IndexReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], IndexError> {
        if len > self.remaining() {
            debug!(target: "retrace::index", pos = self.pos, len, data_len = self.data.len(), "read out of bounds");
            return Err(IndexError::Truncated);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> Result<u32, IndexError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64, IndexError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> Result<String, IndexError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

impl Index {
    pub fn new(
        entries: HashMap<String, IndexEntry>,
        source_file_size: u64,
        source_file_mtime: u64,
    ) -> Self {
        Self {
            entries,
            source_file_size,
            source_file_mtime,
        }
    }

    pub fn get(&self, obfuscated_name: &str) -> Option<&IndexEntry> {
        self.entries.get(obfuscated_name)
    }

    pub fn contains(&self, obfuscated_name: &str) -> bool {
        self.entries.contains_key(obfuscated_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn source_file_size(&self) -> u64 {
        self.source_file_size
    }

    pub fn source_file_mtime(&self) -> u64 {
        self.source_file_mtime
    }

    /// True iff `path` still has exactly the size and mtime this index was
    /// built from. A missing or unreadable file is never valid.
    pub fn is_valid_for(&self, path: &Path) -> bool {
        match file_identity(path) {
            Ok((size, mtime)) => size == self.source_file_size && mtime == self.source_file_mtime,
            Err(_) => false,
        }
    }

    /// Entries are written in file order so identical indexes serialize to
    /// identical bytes.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), IndexError> {
        Self::write_header(&mut w)?;
        w.write_all(&self.source_file_size.to_le_bytes())?;
        w.write_all(&self.source_file_mtime.to_le_bytes())?;

        let count = u32::try_from(self.entries.len())
            .map_err(|_| IndexError::Corrupt(format!("too many entries: {}", self.entries.len())))?;
        w.write_all(&count.to_le_bytes())?;

        let mut ordered: Vec<&IndexEntry> = self.entries.values().collect();
        ordered.sort_by_key(|e| e.byte_offset);
        for entry in ordered {
            write_string(&mut w, &entry.obfuscated_name)?;
            write_string(&mut w, &entry.original_name)?;
            w.write_all(&entry.byte_offset.to_le_bytes())?;
            w.write_all(&entry.byte_length.to_le_bytes())?;
        }
        w.flush()?;
        Ok(())
    }

    /// Writes through a temporary sibling and renames it into place, so a
    /// concurrent reader sees either the old or the new index.
    pub fn write_to_path(&self, path: &Path) -> Result<(), IndexError> {
        let mut tmp_os = path.as_os_str().to_os_string();
        tmp_os.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp_os);

        let file = File::create(&tmp).map_err(|e| {
            error!(target: "retrace::index", error = %e, path = %tmp.display(), "Failed to create index file");
            e
        })?;
        self.write_to(BufWriter::new(file))?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read_from(data: &[u8]) -> Result<Self, IndexError> {
        let mut header_bytes = data;
        Self::read_and_validate_header(&mut header_bytes)?;

        let mut reader = IndexReader::new(&data[BinaryHeader::TOTAL_LEN..]);
        let source_file_size = reader.read_u64()?;
        let source_file_mtime = reader.read_u64()?;
        let count = reader.read_u32()? as usize;
        if count.saturating_mul(MIN_ENTRY_LEN) > reader.remaining() {
            return Err(IndexError::Truncated);
        }

        let mut entries = HashMap::with_capacity(count);
        for _ in 0..count {
            let obfuscated_name = reader.read_string()?;
            let original_name = reader.read_string()?;
            let byte_offset = reader.read_u64()?;
            let byte_length = reader.read_u32()?;
            let entry = IndexEntry {
                obfuscated_name,
                original_name,
                byte_offset,
                byte_length,
            };
            match entry.checked_end_offset() {
                Some(end) if end <= source_file_size => {}
                end => {
                    return Err(IndexError::Corrupt(format!(
                        "entry {} at offset {} length {} ends past source size {} (end {:?})",
                        entry.obfuscated_name,
                        entry.byte_offset,
                        entry.byte_length,
                        source_file_size,
                        end
                    )));
                }
            }
            entries.insert(entry.obfuscated_name.clone(), entry);
        }

        if reader.remaining() != 0 {
            return Err(IndexError::Corrupt(format!(
                "{} trailing bytes after {} entries",
                reader.remaining(),
                count
            )));
        }

        Ok(Self {
            entries,
            source_file_size,
            source_file_mtime,
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, IndexError> {
        let file = File::open(path)?;
        if file.metadata()?.len() < BinaryHeader::TOTAL_LEN as u64 {
            return Err(IndexError::Truncated);
        }
        // SAFETY: sidecars are only ever replaced by rename, never rewritten
        // in place, so the mapped inode does not change under us.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::read_from(&mmap)
    }
}

fn write_string<W: Write>(w: &mut W, value: &str) -> Result<(), IndexError> {
    let bytes = value.as_bytes();
    let len = u32::try_from(bytes.len())
        .map_err(|_| IndexError::Corrupt(format!("name too long: {} bytes", bytes.len())))?;
    w.write_all(&len.to_le_bytes())?;
    w.write_all(bytes)?;
    Ok(())
}
