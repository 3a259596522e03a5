use bundlescope_core::config::BundlescopeConfig;
use bundlescope_core::resolver::RequestContext;
use bundlescope_runtime::{build_default_runtime, build_runtime};
use tempfile::TempDir;

fn write_bundle(dir: &TempDir, version: &str) {
    std::fs::write(
        dir.path().join("site.json"),
        format!(
            r#"[
                {{ "assets": [ {{ "name": "site", "version": "{version}", "type": "stylesheet", "local": "site.css" }} ] }},
                {{ "scope": "admin", "assets": [ {{ "name": "admin", "version": "1", "type": "script", "remote": "https://cdn.example/admin.js" }} ] }}
            ]"#
        ),
    )
    .unwrap();
}

fn config_for(dir: &TempDir) -> BundlescopeConfig {
    BundlescopeConfig {
        bundles: vec![dir.path().to_path_buf()],
        ..Default::default()
    }
}

#[test]
fn test_default_runtime_loads_configured_bundles() {
    let dir = TempDir::new().unwrap();
    write_bundle(&dir, "1");

    let runtime = build_default_runtime(config_for(&dir)).unwrap();
    let html = runtime
        .resolver()
        .render(&RequestContext::new("/app", "/"), &["admin"])
        .unwrap();

    assert_eq!(
        html,
        "<link rel=\"stylesheet\" href=\"/app/static/site.css\">\n<script src=\"https://cdn.example/admin.js\"></script>"
    );
}

#[test]
fn test_reload_picks_up_changes_and_clears_caches() {
    let dir = TempDir::new().unwrap();
    write_bundle(&dir, "1");
    let runtime = build_default_runtime(config_for(&dir)).unwrap();
    let ctx = RequestContext::new("", "/");

    let before = runtime.resolver().assets_for_request(&ctx, &["admin"]).unwrap();
    assert_eq!(before[0].version, "1");

    write_bundle(&dir, "2");
    // cached until an administrative reload
    let cached = runtime.resolver().assets_for_request(&ctx, &["admin"]).unwrap();
    assert_eq!(cached[0].version, "1");

    let report = runtime.reload().unwrap();
    assert_eq!(report.stored, 2);
    let after = runtime.resolver().assets_for_request(&ctx, &["admin"]).unwrap();
    assert_eq!(after[0].version, "2");
}

#[test]
fn test_clear_caches_keeps_registry() {
    let dir = TempDir::new().unwrap();
    write_bundle(&dir, "1");
    let runtime = build_default_runtime(config_for(&dir)).unwrap();

    runtime
        .resolver()
        .assets_for_request(&RequestContext::default(), &["admin"])
        .unwrap();
    assert_eq!(runtime.cache_stats()[0].entries, 1);

    runtime.clear_caches();
    assert!(runtime.cache_stats().iter().all(|s| s.entries == 0));
    assert_eq!(runtime.registry().assets_for(&["admin"]).unwrap().len(), 2);
}

#[test]
fn test_zero_capacity_is_rejected() {
    let mut config = BundlescopeConfig::default();
    config.cache.content_capacity = 0;
    assert!(build_runtime(config).is_err());
}
