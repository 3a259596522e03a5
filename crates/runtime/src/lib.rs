use bundlescope_api::{AssetRegistry, CacheStats};
use bundlescope_core::bundle::{BundleLoader, LoadReport};
use bundlescope_core::cache::BoundedLruStore;
use bundlescope_core::config::BundlescopeConfig;
use bundlescope_core::render::LocationResolver;
use bundlescope_core::resolver::RequestAssetResolver;
use bundlescope_core::scope::ScopeRegistry;
use std::sync::Arc;
use tracing::info;

/// A registry, its caches and the resolver serving pages from them.
pub struct Runtime {
    config: BundlescopeConfig,
    registry: Arc<ScopeRegistry>,
    resolver: Arc<RequestAssetResolver>,
}

impl Runtime {
    pub fn config(&self) -> &BundlescopeConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<dyn AssetRegistry> {
        self.registry.clone()
    }

    pub fn resolver(&self) -> Arc<RequestAssetResolver> {
        self.resolver.clone()
    }

    pub fn loader(&self) -> BundleLoader {
        BundleLoader::new(self.registry.clone())
    }

    /// Load every bundle path from the configuration
    pub fn load_bundles(&self) -> bundlescope_core::Result<LoadReport> {
        self.loader().load_paths(&self.config.bundles)
    }

    /// Forget every scope and cached entry, then load the configured bundles
    /// again. Caches are dropped once more after loading, since requests
    /// served meanwhile saw a partially loaded registry.
    pub fn reload(&self) -> bundlescope_core::Result<LoadReport> {
        info!("Reloading bundles");
        self.registry.clear_all();
        self.resolver.invalidate();
        let report = self.load_bundles();
        self.resolver.invalidate();
        report
    }

    pub fn clear_caches(&self) {
        info!("Clearing asset caches");
        self.resolver.invalidate();
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        self.resolver.cache_stats()
    }
}

/// Assemble a runtime from `config` without loading any bundle.
pub fn build_runtime(config: BundlescopeConfig) -> bundlescope_core::Result<Runtime> {
    let registry = Arc::new(ScopeRegistry::new());
    let requests = Arc::new(BoundedLruStore::new(
        "requests",
        config.cache.request_capacity()?,
    ));
    let contents = Arc::new(BoundedLruStore::new(
        "contents",
        config.cache.content_capacity()?,
    ));

    let resolver = RequestAssetResolver::new(registry.clone(), requests, contents)
        .with_locations(LocationResolver::from_config(&config.render));

    Ok(Runtime {
        config,
        registry,
        resolver: Arc::new(resolver),
    })
}

/// Assemble a runtime and load the configured bundles.
pub fn build_default_runtime(config: BundlescopeConfig) -> bundlescope_core::Result<Runtime> {
    let runtime = build_runtime(config)?;
    runtime.load_bundles()?;
    Ok(runtime)
}

/// Initializes logging for `component` with the directory and filter from
/// `config`. Keep the returned guard alive until exit.
pub fn init_logging(
    component: &str,
    config: &BundlescopeConfig,
    to_stderr: bool,
) -> Option<impl Drop + use<>> {
    Some(bundlescope_core::logging::init_logging(
        component,
        &config.logging,
        to_stderr,
    ))
}
