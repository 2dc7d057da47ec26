use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::engine::types::VersionKey;

pub const MAPPING_FILE_NAME: &str = "mapping.txt";
pub const SIDECAR_FILE_NAME: &str = "mapping.idx";

/// Returns an absolute version of the provided path without touching the filesystem.
/// Falls back to the original path if the current working directory cannot be resolved.
pub fn absolutize<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        return path.to_path_buf();
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// `{root}/{appId}/{versionName}/{versionCode}`
pub fn version_dir(root: &Path, key: &VersionKey) -> PathBuf {
    root.join(&key.app_id)
        .join(&key.version_name)
        .join(key.version_code.to_string())
}

pub fn mapping_path(root: &Path, key: &VersionKey) -> PathBuf {
    version_dir(root, key).join(MAPPING_FILE_NAME)
}

/// The sidecar index always sits next to the mapping file it describes.
pub fn sidecar_path(mapping: &Path) -> PathBuf {
    mapping.with_file_name(SIDECAR_FILE_NAME)
}

/// Size in bytes and modification time in nanoseconds since the epoch.
pub fn file_identity(path: &Path) -> io::Result<(u64, u64)> {
    let meta = fs::metadata(path)?;
    let mtime = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    Ok((meta.len(), u64::try_from(mtime).unwrap_or(u64::MAX)))
}
