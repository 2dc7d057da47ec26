use crate::engine::errors::IndexError;
use crate::engine::index::{Index, IndexEntry};
use crate::shared::path::{file_identity, sidecar_path};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const HEADER_SEPARATOR: &str = " -> ";

/// Builds the byte-offset index of a mapping file, reusing the sidecar when it
/// still describes the file.
pub struct IndexBuilder;

impl IndexBuilder {
    /// Returns the index for `mapping`, from the sidecar when valid, otherwise
    /// by scanning. A failure to persist a freshly scanned index is logged and
    /// does not fail the build.
    pub fn build(mapping: &Path, force_rebuild: bool) -> Result<Index, IndexError> {
        let sidecar = sidecar_path(mapping);

        if !force_rebuild && sidecar.exists() {
            match Index::load_from_path(&sidecar) {
                Ok(index) if index.is_valid_for(mapping) => {
                    debug!(target: "retrace::index", path = %sidecar.display(), entries = index.len(), "Loaded sidecar index");
                    return Ok(index);
                }
                Ok(_) => {
                    debug!(target: "retrace::index", path = %sidecar.display(), "Sidecar index is stale, rebuilding");
                }
                Err(e) if e.is_corrupt() => {
                    debug!(target: "retrace::index", path = %sidecar.display(), error = %e, "Corrupt sidecar index, rebuilding");
                }
                Err(e) => {
                    warn!(target: "retrace::index", path = %sidecar.display(), error = %e, "Unreadable sidecar index, rebuilding");
                }
            }
        }

        let index = Self::scan(mapping)?;

        if let Err(e) = index.write_to_path(&sidecar) {
            warn!(target: "retrace::index", path = %sidecar.display(), error = %e, "Failed to persist sidecar index");
        }

        Ok(index)
    }

    /// Scans `mapping` once, recording where every class section starts and
    /// how many bytes it spans.
    pub fn scan(mapping: &Path) -> Result<Index, IndexError> {
        let start = Instant::now();
        let (size, mtime) = file_identity(mapping)?;
        let file = File::open(mapping)?;
        let entries = scan_sections(BufReader::new(file))?;

        info!(
            target: "retrace::index",
            path = %mapping.display(),
            classes = entries.len(),
            bytes = size,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scanned mapping file"
        );

        Ok(Index::new(entries, size, mtime))
    }
}

struct OpenSection {
    obfuscated: String,
    original: String,
    start: u64,
}

/// Splits the stream into class sections. Every byte after the first header
/// belongs to exactly one section.
pub(crate) fn scan_sections<R: BufRead>(
    mut reader: R,
) -> Result<HashMap<String, IndexEntry>, IndexError> {
    let mut entries: HashMap<String, IndexEntry> = HashMap::new();
    let mut open: Option<OpenSection> = None;
    let mut offset: u64 = 0;
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }

        if let Some((original, obfuscated)) = parse_class_header(&line) {
            let seen = entries.contains_key(obfuscated)
                || open.as_ref().is_some_and(|section| section.obfuscated == obfuscated);
            if seen {
                // The first section keeps the name; the repeat rides along with
                // whatever section is open so no byte is left unowned.
                warn!(target: "retrace::index", class = %obfuscated, offset, "Duplicate class header, keeping first section");
                offset += read as u64;
                continue;
            }
            if let Some(section) = open.take() {
                close_section(&mut entries, section, offset)?;
            }
            open = Some(OpenSection {
                obfuscated: obfuscated.to_string(),
                original: original.to_string(),
                start: offset,
            });
        }

        offset += read as u64;
    }

    if let Some(section) = open.take() {
        close_section(&mut entries, section, offset)?;
    }

    Ok(entries)
}

fn close_section(
    entries: &mut HashMap<String, IndexEntry>,
    section: OpenSection,
    end: u64,
) -> Result<(), IndexError> {
    let byte_length = u32::try_from(end - section.start).map_err(|_| {
        IndexError::Corrupt(format!(
            "class section {} spans {} bytes",
            section.obfuscated,
            end - section.start
        ))
    })?;

    let entry = IndexEntry::new(section.obfuscated.clone(), section.original, section.start, byte_length);
    entries.insert(section.obfuscated, entry);
    Ok(())
}

/// Recognises `original -> obfuscated:` lines. Member lines are indented,
/// comments start with `#`, and neither ever opens a section.
pub(crate) fn parse_class_header(line: &[u8]) -> Option<(&str, &str)> {
    let first = *line.first()?;
    if first.is_ascii_whitespace() || first == b'#' {
        return None;
    }

    let text = std::str::from_utf8(line).ok()?.trim_end();
    let body = text.strip_suffix(':')?;
    let (original, obfuscated) = body.split_once(HEADER_SEPARATOR)?;

    let original = original.trim();
    let obfuscated = obfuscated.trim();
    if original.is_empty() || obfuscated.is_empty() {
        return None;
    }
    Some((original, obfuscated))
}
