use crate::engine::types::VersionKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one pre-warm pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrewarmSummary {
    pub discovered: usize,
    pub planned: usize,
    pub loaded: usize,
    pub failed: Vec<VersionKey>,
}

/// Picks the versions to materialize at startup: per application (in
/// ascending app id order) the `per_app` most recent versions, cut off at
/// `total` overall.
pub fn plan_prewarm(versions: &[VersionKey], per_app: usize, total: usize) -> Vec<VersionKey> {
    let mut by_app: BTreeMap<&str, Vec<&VersionKey>> = BTreeMap::new();
    for key in versions {
        by_app.entry(key.app_id.as_str()).or_default().push(key);
    }

    let mut plan = Vec::new();
    for (_, mut keys) in by_app {
        keys.sort_by(|a, b| a.recency_cmp(b));
        plan.extend(keys.into_iter().take(per_app).cloned());
    }
    plan.truncate(total);
    plan
}
