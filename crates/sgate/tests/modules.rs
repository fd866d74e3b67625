use sgate::domain::constants::{
    ANALYTICS_PREFIX, BLOGS_PREFIX, FILTERS_PREFIX, SEARCH_PREFIX, STATUS_PREFIX,
    WEBHOOK_PREFIX,
};
use std::collections::HashSet;

#[test]
fn every_module_has_a_distinct_api_prefix() {
    let mounts = sgate::modules();
    let prefixes: HashSet<_> = mounts.iter().map(|m| m.prefix).collect();

    assert_eq!(prefixes.len(), mounts.len());
    assert!(prefixes.iter().all(|p| p.starts_with("/api/") && !p.ends_with('/')));
    assert_eq!(
        prefixes,
        HashSet::from([
            SEARCH_PREFIX,
            FILTERS_PREFIX,
            ANALYTICS_PREFIX,
            WEBHOOK_PREFIX,
            BLOGS_PREFIX,
            STATUS_PREFIX,
        ])
    );
}

#[test]
fn modules_document_their_routes() {
    for mount in sgate::modules() {
        let (_, api) = mount.router.split_for_parts();
        assert!(!api.paths.paths.is_empty(), "{} has no documented paths", mount.prefix);
    }
}
