//! Cache keys for request-level asset sets and rendered content.

use bundlescope_api::Asset;
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Fingerprint of a page request: context path, requested scopes (in
/// order) and resource path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(context_path: &str, scopes: &[&str], resource_path: &str) -> Self {
        let mut hasher = Xxh3::new();
        write_component(&mut hasher, context_path);
        hasher.update(&(scopes.len() as u64).to_le_bytes());
        for scope in scopes {
            write_component(&mut hasher, scope);
        }
        write_component(&mut hasher, resource_path);
        Self(format!("req-{:016x}", hasher.digest()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of one rendered asset: identity, version, type and resolved location.
pub fn content_key(asset: &Asset, location: &str) -> String {
    let mut hasher = Xxh3::new();
    write_component(&mut hasher, &asset.name);
    write_component(&mut hasher, &asset.version);
    write_component(
        &mut hasher,
        asset.asset_type.map(|t| t.as_str()).unwrap_or_default(),
    );
    write_component(&mut hasher, location);
    format!("content-{:016x}", hasher.digest())
}

// Length prefix keeps ("ab", "c") and ("a", "bc") apart
fn write_component(hasher: &mut Xxh3, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}
