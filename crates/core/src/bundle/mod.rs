//! JSON bundle definitions.
//!
//! A bundle file holds one definition or an array of them:
//!
//! ```json
//! [
//!   { "scope": "admin", "parent": "default",
//!     "assets": [ { "name": "chart", "version": "4.4", "type": "script",
//!                   "remote": "https://cdn.example/chart.js" } ] },
//!   { "scope": "reports", "parent": "admin" }
//! ]
//! ```
//!
//! `scope` and `parent` default to the root scope. A definition without
//! assets registers an empty scope so later definitions can use it as a
//! parent.

pub mod loader;

pub use loader::{BundleLoader, LoadReport};

use bundlescope_api::{Asset, DEFAULT_SCOPE};
use serde::{Deserialize, Serialize};

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleDefinition {
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_scope")]
    pub parent: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl BundleDefinition {
    pub fn new(scope: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            parent: parent.into(),
            assets: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }
}

/// On-disk shape of a bundle file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BundleFile {
    Many(Vec<BundleDefinition>),
    One(BundleDefinition),
}

impl BundleFile {
    pub fn into_definitions(self) -> Vec<BundleDefinition> {
        match self {
            BundleFile::Many(defs) => defs,
            BundleFile::One(def) => vec![def],
        }
    }
}
