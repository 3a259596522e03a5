//! Thread-safe scope registry
//!
//! Wraps a [`ScopeGraph`] in a single `RwLock`: `store` and `clear_all`
//! take it exclusively, queries share it.

use super::graph::ScopeGraph;
use bundlescope_api::models::{Asset, DEFAULT_SCOPE, DETACHED_SCOPE, ScopeInfo};
use bundlescope_api::{
    AssetRegistry, RegistryError, RegistryResult, SkipReason, StoreOutcome,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

pub struct ScopeRegistry {
    graph: RwLock<ScopeGraph>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::from_graph(ScopeGraph::new())
    }

    /// Start from a prepared graph
    pub fn from_graph(graph: ScopeGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ScopeGraph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScopeGraph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store into the root scope
    pub fn store_default(&self, asset: Asset) -> RegistryResult<StoreOutcome> {
        self.store(Some(asset), DEFAULT_SCOPE, DEFAULT_SCOPE)
    }

    pub fn contains_scope(&self, scope: &str) -> bool {
        self.read().contains(scope)
    }

    pub fn scope_count(&self) -> usize {
        self.read().scope_count()
    }

    /// Copy of the current graph
    pub fn snapshot(&self) -> ScopeGraph {
        self.read().clone()
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry for ScopeRegistry {
    fn store(
        &self,
        asset: Option<Asset>,
        scope: &str,
        parent: &str,
    ) -> RegistryResult<StoreOutcome> {
        if let Some(asset) = asset.as_ref().filter(|a| !a.is_valid()) {
            warn!("Ignoring invalid asset '{}' for scope '{}'", asset.name, scope);
            return Ok(StoreOutcome::Skipped(SkipReason::InvalidAsset));
        }

        if scope == DETACHED_SCOPE {
            return Err(RegistryError::DetachScopeNotAllowed {
                asset: asset.map(|a| a.name).unwrap_or_default(),
            });
        }

        let mut graph = self.write();
        let idx = graph.ensure_scope(scope, parent)?;

        let Some(asset) = asset else {
            debug!("Registered empty scope '{}' under '{}'", scope, parent);
            return Ok(StoreOutcome::Skipped(SkipReason::EmptyScope));
        };

        if let Some(existing) = graph.own_asset(idx, asset.identity()) {
            if existing.conflicts_with(&asset) {
                return Err(RegistryError::AssetAlreadyExistsInScope {
                    scope: scope.to_string(),
                    original: Box::new((**existing).clone()),
                    conflicting: Box::new(asset),
                });
            }
            debug!("Asset '{}' already declared in scope '{}'", asset.name, scope);
            return Ok(StoreOutcome::Skipped(SkipReason::Duplicate));
        }

        debug!("Stored {} in scope '{}'", asset, scope);
        graph.append_asset(idx, Arc::new(asset));
        Ok(StoreOutcome::Stored)
    }

    fn assets_for(&self, scopes: &[&str]) -> RegistryResult<Vec<Arc<Asset>>> {
        let graph = self.read();
        if scopes.is_empty() {
            return Ok(graph.root_assets());
        }
        graph.assets_transitively_visible_from(scopes)
    }

    fn clear_all(&self) {
        *self.write() = ScopeGraph::new();
        debug!("Scope registry reset");
    }

    fn scopes(&self) -> Vec<ScopeInfo> {
        self.read().scopes()
    }
}
