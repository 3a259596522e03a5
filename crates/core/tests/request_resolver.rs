//! Request-level caching and rendering

use bundlescope_api::{
    Asset, AssetRegistry, AssetType, DEFAULT_SCOPE, RegistryError, RegistryResult, ScopeInfo,
    StoreOutcome,
};
use bundlescope_core::cache::BoundedLruStore;
use bundlescope_core::config::LocationPolicy;
use bundlescope_core::render::{LocationResolver, TagRenderer};
use bundlescope_core::resolver::{RequestAssetResolver, RequestContext};
use bundlescope_core::scope::ScopeRegistry;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

struct CountingRenderer(AtomicUsize);

impl TagRenderer for CountingRenderer {
    fn render(&self, asset: &Asset, location: &str) -> String {
        self.0.fetch_add(1, Ordering::SeqCst);
        format!("[{}:{}]", asset.name, location)
    }
}

fn build(registry: Arc<ScopeRegistry>, capacity: usize) -> RequestAssetResolver {
    let capacity = NonZeroUsize::new(capacity).unwrap();
    RequestAssetResolver::new(
        registry,
        Arc::new(BoundedLruStore::new("requests", capacity)),
        Arc::new(BoundedLruStore::new("contents", capacity)),
    )
}

fn registry() -> Arc<ScopeRegistry> {
    let registry = Arc::new(ScopeRegistry::new());
    registry
        .store_default(
            Asset::new("jquery", "3", AssetType::Script)
                .with_remote("https://cdn.example/jquery.js")
                .with_local("js/jquery.js"),
        )
        .unwrap();
    registry
        .store(
            Some(Asset::new("admin", "1", AssetType::Stylesheet).with_local("css/admin.css")),
            "admin",
            DEFAULT_SCOPE,
        )
        .unwrap();
    registry
}

#[test]
fn test_rendered_tags_are_reused_across_requests() {
    let renderer = Arc::new(CountingRenderer(AtomicUsize::new(0)));
    let resolver = build(registry(), 16)
        .with_locations(LocationResolver::new(LocationPolicy::LocalFirst, "/assets"))
        .with_renderer(renderer.clone());

    let first = resolver
        .render(&RequestContext::new("/shop", "/a"), &["admin"])
        .unwrap();
    let second = resolver
        .render(&RequestContext::new("/shop", "/b"), &["admin"])
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first,
        "[jquery:/shop/assets/js/jquery.js]\n[admin:/shop/assets/css/admin.css]"
    );
    assert_eq!(renderer.0.load(Ordering::SeqCst), 2);
}

#[test]
fn test_request_cache_is_bounded() {
    let resolver = build(registry(), 2);
    for page in ["/a", "/b", "/c"] {
        resolver
            .assets_for_request(&RequestContext::new("", page), &[DEFAULT_SCOPE])
            .unwrap();
    }
    let stats = &resolver.cache_stats()[0];
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.evictions, 1);
}

#[test]
fn test_conflicts_are_not_cached() {
    let registry = Arc::new(ScopeRegistry::new());
    for (scope, version) in [("left", "1"), ("right", "2")] {
        registry
            .store(
                Some(Asset::new("dup", version, AssetType::Script).with_local("dup.js")),
                scope,
                DEFAULT_SCOPE,
            )
            .unwrap();
    }
    let resolver = build(registry.clone(), 4);
    let ctx = RequestContext::new("", "/");

    let err = resolver.assets_for_request(&ctx, &["left", "right"]).unwrap_err();
    assert!(matches!(err, RegistryError::AssetAlreadyExistsInScope { .. }));
    assert_eq!(resolver.cache_stats()[0].entries, 0);

    // administrative reset clears both sides
    registry.clear_all();
    resolver.invalidate();
    assert!(matches!(
        resolver.assets_for_request(&ctx, &["left"]),
        Err(RegistryError::UnknownScope(_))
    ));
}

/// Resolves through `inner`, then parks the first gated call until the test
/// releases it.
struct GatedRegistry {
    inner: Arc<ScopeRegistry>,
    gated: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl AssetRegistry for GatedRegistry {
    fn store(
        &self,
        asset: Option<Asset>,
        scope: &str,
        parent: &str,
    ) -> RegistryResult<StoreOutcome> {
        self.inner.store(asset, scope, parent)
    }

    fn assets_for(&self, scopes: &[&str]) -> RegistryResult<Vec<Arc<Asset>>> {
        let assets = self.inner.assets_for(scopes);
        if self.gated.swap(false, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        assets
    }

    fn clear_all(&self) {
        self.inner.clear_all()
    }

    fn scopes(&self) -> Vec<ScopeInfo> {
        self.inner.scopes()
    }
}

fn local(name: &str) -> Asset {
    Asset::new(name, "1", AssetType::Script).with_local(format!("{name}.js"))
}

fn names(assets: &[Arc<Asset>]) -> Vec<String> {
    assets.iter().map(|a| a.name.clone()).collect()
}

#[test]
fn test_set_resolved_before_invalidate_is_not_cached() {
    let inner = Arc::new(ScopeRegistry::new());
    inner.store_default(local("old")).unwrap();

    let gated = Arc::new(GatedRegistry {
        inner: inner.clone(),
        gated: AtomicBool::new(true),
        entered: Barrier::new(2),
        release: Barrier::new(2),
    });
    let capacity = NonZeroUsize::new(4).unwrap();
    let resolver = RequestAssetResolver::new(
        gated.clone(),
        Arc::new(BoundedLruStore::new("requests", capacity)),
        Arc::new(BoundedLruStore::new("contents", capacity)),
    );
    let ctx = RequestContext::new("", "/");

    let in_flight = std::thread::scope(|s| {
        let request = s.spawn(|| resolver.assets_for_request(&ctx, &[DEFAULT_SCOPE]).unwrap());

        gated.entered.wait();
        inner.clear_all();
        resolver.invalidate();
        inner.store_default(local("new")).unwrap();
        gated.release.wait();

        request.join().unwrap()
    });

    assert_eq!(names(&in_flight), vec!["old"]);
    assert_eq!(resolver.cache_stats()[0].entries, 0);

    let fresh = resolver.assets_for_request(&ctx, &[DEFAULT_SCOPE]).unwrap();
    assert_eq!(names(&fresh), vec!["new"]);
}
