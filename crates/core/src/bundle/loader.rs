//! Feeds bundle definitions into an [`AssetRegistry`].

use super::{BundleDefinition, BundleFile};
use crate::error::{BundlescopeError, Result};
use bundlescope_api::{AssetRegistry, StoreOutcome};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use walkdir::WalkDir;

/// Counters for one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub bundles: usize,
    pub stored: usize,
    pub skipped: usize,
}

impl LoadReport {
    fn merge(&mut self, other: LoadReport) {
        self.bundles += other.bundles;
        self.stored += other.stored;
        self.skipped += other.skipped;
    }
}

pub struct BundleLoader {
    registry: Arc<dyn AssetRegistry>,
}

impl BundleLoader {
    pub fn new(registry: Arc<dyn AssetRegistry>) -> Self {
        Self { registry }
    }

    /// Load a bundle file, or every `*.json` file below a directory.
    pub fn load_path(&self, path: &Path) -> Result<LoadReport> {
        let definitions = Self::read_path(path)?;
        let report = self.load_definitions(definitions)?;
        info!(
            "Loaded {} bundles from {} ({} assets stored, {} skipped)",
            report.bundles,
            path.display(),
            report.stored,
            report.skipped
        );
        Ok(report)
    }

    pub fn load_paths<'a>(&self, paths: impl IntoIterator<Item = &'a PathBuf>) -> Result<LoadReport> {
        let mut total = LoadReport::default();
        for path in paths {
            total.merge(self.load_path(path)?);
        }
        Ok(total)
    }

    pub fn load_str(&self, json: &str) -> Result<LoadReport> {
        let file: BundleFile = serde_json::from_str(json)?;
        self.load_definitions(file.into_definitions())
    }

    /// Store a batch. Parents declared in the batch are stored before their
    /// children; the first registry error aborts the load.
    pub fn load_definitions(&self, definitions: Vec<BundleDefinition>) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for def in order_by_parent(definitions) {
            report.bundles += 1;

            if def.assets.is_empty() {
                self.store(None, &def)?;
                report.skipped += 1;
                continue;
            }

            for asset in &def.assets {
                match self.store(Some(asset.clone()), &def)? {
                    StoreOutcome::Stored => report.stored += 1,
                    StoreOutcome::Skipped(_) => report.skipped += 1,
                }
            }
        }

        Ok(report)
    }

    fn store(
        &self,
        asset: Option<bundlescope_api::Asset>,
        def: &BundleDefinition,
    ) -> Result<StoreOutcome> {
        self.registry
            .store(asset, &def.scope, &def.parent)
            .map_err(|e| {
                error!("Bundle for scope '{}' rejected: {}", def.scope, e);
                BundlescopeError::from(e)
            })
    }

    /// Parse definitions without touching the registry
    pub fn read_path(path: &Path) -> Result<Vec<BundleDefinition>> {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();

            let mut definitions = Vec::new();
            for file in files {
                definitions.extend(Self::read_file(&file)?);
            }
            Ok(definitions)
        } else {
            Self::read_file(path)
        }
    }

    fn read_file(path: &Path) -> Result<Vec<BundleDefinition>> {
        let content = std::fs::read_to_string(path)?;
        let file: BundleFile =
            serde_json::from_str(&content).map_err(|e| BundlescopeError::Bundle {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(file.into_definitions())
    }
}

/// Stable ordering in which a scope declared in the batch comes before any
/// definition naming it as parent. Definitions stuck in a cycle keep their
/// relative order at the end and fail in the registry.
pub fn order_by_parent(definitions: Vec<BundleDefinition>) -> Vec<BundleDefinition> {
    let declared: HashSet<String> = definitions.iter().map(|d| d.scope.clone()).collect();
    let mut emitted: HashSet<String> = HashSet::new();
    let mut ordered = Vec::with_capacity(definitions.len());
    let mut remaining = definitions;

    loop {
        let before = remaining.len();
        let mut deferred = Vec::new();

        for def in remaining {
            let ready = def.parent == def.scope
                || !declared.contains(&def.parent)
                || emitted.contains(&def.parent);
            if ready {
                emitted.insert(def.scope.clone());
                ordered.push(def);
            } else {
                deferred.push(def);
            }
        }

        if deferred.is_empty() || deferred.len() == before {
            ordered.extend(deferred);
            return ordered;
        }
        remaining = deferred;
    }
}
