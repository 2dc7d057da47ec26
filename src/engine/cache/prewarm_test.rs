use super::prewarm::plan_prewarm;
use crate::engine::types::VersionKey;

fn key(app: &str, name: &str, code: u64) -> VersionKey {
    VersionKey::new(app, name, code)
}

#[test]
fn takes_most_recent_per_app() {
    let versions = vec![
        key("b", "1.0", 1),
        key("a", "1.0", 1),
        key("a", "3.0", 3),
        key("a", "2.0", 2),
        key("b", "2.0", 2),
    ];

    let plan = plan_prewarm(&versions, 2, 10);

    assert_eq!(
        plan,
        vec![
            key("a", "3.0", 3),
            key("a", "2.0", 2),
            key("b", "2.0", 2),
            key("b", "1.0", 1),
        ]
    );
}

#[test]
fn version_name_breaks_code_ties() {
    let versions = vec![key("a", "1.0-beta", 5), key("a", "1.0-rc", 5)];
    assert_eq!(plan_prewarm(&versions, 1, 10), vec![key("a", "1.0-rc", 5)]);
}

#[test]
fn total_cap_truncates_plan() {
    let versions = vec![key("a", "1", 1), key("b", "1", 1), key("c", "1", 1)];
    let plan = plan_prewarm(&versions, 1, 2);
    assert_eq!(plan, vec![key("a", "1", 1), key("b", "1", 1)]);
}

#[test]
fn zero_per_app_plans_nothing() {
    assert!(plan_prewarm(&[key("a", "1", 1)], 0, 10).is_empty());
}
