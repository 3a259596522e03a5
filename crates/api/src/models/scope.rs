use serde::{Deserialize, Serialize};

/// Root scope. Always present, has no parent.
pub const DEFAULT_SCOPE: &str = "default";

/// Parent-only marker for scopes that must not inherit root assets.
pub const DETACHED_SCOPE: &str = "detached";

/// Snapshot of one scope as seen by listing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInfo {
    pub name: String,
    /// `None` for the root and detached scopes.
    pub parent: Option<String>,
    pub asset_count: usize,
}
