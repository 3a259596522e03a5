//! Scope-based asset registry.
//!
//! ```text
//!   default ─┬─ admin ── admin-reports
//!            └─ shop
//!   detached ── widget        (does not inherit from default)
//! ```
//!
//! [`ScopeGraph`] owns the hierarchy and the per-scope asset lists,
//! [`ScopeRegistry`] is the shared, lock-protected entry point implementing
//! [`bundlescope_api::AssetRegistry`].

pub mod graph;
pub mod registry;

pub use graph::{ScopeGraph, ScopeNode};
pub use registry::ScopeRegistry;
