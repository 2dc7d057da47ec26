use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identity of one uploaded mapping: application, version name and version code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub app_id: String,
    pub version_name: String,
    pub version_code: u64,
}

impl VersionKey {
    pub fn new(app_id: impl Into<String>, version_name: impl Into<String>, version_code: u64) -> Self {
        Self {
            app_id: app_id.into(),
            version_name: version_name.into(),
            version_code,
        }
    }

    /// Most recent first: higher version code, then higher version name.
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        other
            .version_code
            .cmp(&self.version_code)
            .then_with(|| other.version_name.cmp(&self.version_name))
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}({})", self.app_id, self.version_name, self.version_code)
    }
}
