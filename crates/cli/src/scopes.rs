use bundlescope_core::config::BundlescopeConfig;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ScopeRow {
    #[tabled(rename = "Scope")]
    name: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Assets")]
    assets: usize,
}

pub fn run(config: BundlescopeConfig, bundles: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = crate::open_runtime(config, bundles)?;

    let rows: Vec<ScopeRow> = runtime
        .registry()
        .scopes()
        .into_iter()
        .map(|s| ScopeRow {
            name: s.name,
            parent: s.parent.unwrap_or_else(|| "-".to_string()),
            assets: s.asset_count,
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
