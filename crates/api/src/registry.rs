use crate::error::RegistryResult;
use crate::models::{Asset, ScopeInfo};
use std::sync::Arc;

/// Why a `store` call completed without adding an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The asset failed validation and was ignored.
    InvalidAsset,
    /// No asset was given; the scope was registered with no assets.
    EmptyScope,
    /// The scope already holds an identical declaration.
    Duplicate,
}

/// Successful result of a `store` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    Skipped(SkipReason),
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, StoreOutcome::Stored)
    }
}

/// Scope-based asset registry.
///
/// Implementations are shared behind `Arc<dyn AssetRegistry>` by loaders,
/// renderers and administrative handlers.
pub trait AssetRegistry: Send + Sync {
    /// Store `asset` in `scope`, creating the scope under `parent` on first
    /// use. `None` registers the scope without any asset.
    fn store(
        &self,
        asset: Option<Asset>,
        scope: &str,
        parent: &str,
    ) -> RegistryResult<StoreOutcome>;

    /// Ordered, deduplicated assets visible from `scopes`. An empty slice
    /// yields the assets declared directly in the root scope.
    fn assets_for(&self, scopes: &[&str]) -> RegistryResult<Vec<Arc<Asset>>>;

    /// Reset to the initial state: root and detached scopes, no assets.
    fn clear_all(&self);

    /// All known scopes in creation order.
    fn scopes(&self) -> Vec<ScopeInfo>;
}
