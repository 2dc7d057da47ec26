use crate::engine::types::VersionKey;
use crate::shared::path::MAPPING_FILE_NAME;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Lists every version under `root` that has a mapping file, walking
/// `{appId}/{versionName}/{versionCode}/mapping.txt`. Directories whose code
/// is not numeric are skipped. A missing root yields no versions.
pub fn discover_versions(root: &Path) -> io::Result<Vec<VersionKey>> {
    let mut found = Vec::new();
    if !root.is_dir() {
        debug!(target: "retrace::prewarm", root = %root.display(), "Mapping root does not exist");
        return Ok(found);
    }

    for app in subdirs(root)? {
        let app_id = match app.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        for name_dir in subdirs(&app)? {
            let version_name = match name_dir.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            for code_dir in subdirs(&name_dir)? {
                let code = code_dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.parse::<u64>().ok());
                let Some(version_code) = code else {
                    debug!(target: "retrace::prewarm", path = %code_dir.display(), "Skipping non-numeric version code");
                    continue;
                };
                if code_dir.join(MAPPING_FILE_NAME).is_file() {
                    found.push(VersionKey::new(app_id.clone(), version_name.clone(), version_code));
                }
            }
        }
    }

    found.sort_by(|a, b| a.app_id.cmp(&b.app_id).then_with(|| a.recency_cmp(b)));
    Ok(found)
}

fn subdirs(dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}
