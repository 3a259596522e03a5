//! Per-request asset resolution with caching.

use crate::cache::{BoundedLruStore, RequestKey, content_key};
use crate::render::{HtmlTagRenderer, LocationResolver, TagRenderer};
use bundlescope_api::{Asset, AssetRegistry, CacheManager, CacheStats, RegistryResult};
use std::sync::Arc;
use tracing::debug;

/// Ordered assets resolved for one request
pub type AssetSet = Arc<[Arc<Asset>]>;

pub type RequestCache = BoundedLruStore<String, AssetSet>;
pub type ContentCache = BoundedLruStore<String, Arc<str>>;

/// The parts of a page request that influence its asset list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub context_path: String,
    pub resource_path: String,
}

impl RequestContext {
    pub fn new(context_path: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            context_path: context_path.into(),
            resource_path: resource_path.into(),
        }
    }

    pub fn key(&self, scopes: &[&str]) -> RequestKey {
        RequestKey::new(&self.context_path, scopes, &self.resource_path)
    }
}

pub struct RequestAssetResolver {
    registry: Arc<dyn AssetRegistry>,
    requests: Arc<RequestCache>,
    contents: Arc<ContentCache>,
    locations: LocationResolver,
    renderer: Arc<dyn TagRenderer>,
}

impl RequestAssetResolver {
    pub fn new(
        registry: Arc<dyn AssetRegistry>,
        requests: Arc<RequestCache>,
        contents: Arc<ContentCache>,
    ) -> Self {
        Self {
            registry,
            requests,
            contents,
            locations: LocationResolver::default(),
            renderer: Arc::new(HtmlTagRenderer),
        }
    }

    pub fn with_locations(mut self, locations: LocationResolver) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TagRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn registry(&self) -> &Arc<dyn AssetRegistry> {
        &self.registry
    }

    /// Assets for `scopes`, served from the request cache when possible.
    /// Failed resolutions are not cached.
    pub fn assets_for_request(
        &self,
        ctx: &RequestContext,
        scopes: &[&str],
    ) -> RegistryResult<AssetSet> {
        let key = ctx.key(scopes);
        self.requests
            .get_or_try_insert_with(key.into_string(), || {
                debug!("Resolving scopes {:?} for {}", scopes, ctx.resource_path);
                self.registry
                    .assets_for(scopes)
                    .map(|assets| assets.into())
            })
    }

    /// Tag for one asset, `None` when it has nowhere to be served from
    pub fn render_asset(&self, ctx: &RequestContext, asset: &Asset) -> Option<Arc<str>> {
        let location = self.locations.resolve(&ctx.context_path, asset)?;
        let key = content_key(asset, &location);
        if let Some(tag) = self.contents.get(&key) {
            return Some(tag);
        }
        let tag: Arc<str> = self.renderer.render(asset, &location).into();
        self.contents.put(key, tag.clone());
        Some(tag)
    }

    /// Markup for every asset visible from `scopes`, one tag per line
    pub fn render(&self, ctx: &RequestContext, scopes: &[&str]) -> RegistryResult<String> {
        let assets = self.assets_for_request(ctx, scopes)?;
        let tags: Vec<Arc<str>> = assets
            .iter()
            .filter_map(|asset| self.render_asset(ctx, asset))
            .collect();
        Ok(tags.join("\n"))
    }

    /// Drop cached request sets and rendered content
    pub fn invalidate(&self) {
        self.requests.clear();
        self.contents.clear();
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        vec![self.requests.stats(), self.contents.stats()]
    }

    pub fn caches(&self) -> Vec<Arc<dyn CacheManager>> {
        let requests: Arc<dyn CacheManager> = self.requests.clone();
        let contents: Arc<dyn CacheManager> = self.contents.clone();
        vec![requests, contents]
    }
}
