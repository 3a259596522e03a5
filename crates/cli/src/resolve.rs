use bundlescope_api::Asset;
use bundlescope_core::config::BundlescopeConfig;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct AssetRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Local")]
    local: String,
}

impl AssetRow {
    fn new(position: usize, asset: &Asset) -> Self {
        Self {
            position,
            name: asset.name.clone(),
            version: asset.version.clone(),
            kind: asset
                .asset_type
                .map(|t| t.to_string())
                .unwrap_or_default(),
            remote: asset.remote().unwrap_or("-").to_string(),
            local: asset.local().unwrap_or("-").to_string(),
        }
    }
}

pub fn run(
    config: BundlescopeConfig,
    bundles: &Path,
    scopes: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = crate::open_runtime(config, bundles)?;
    let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
    let assets = runtime.registry().assets_for(&scopes)?;

    if assets.is_empty() {
        println!("No assets visible from {:?}.", scopes);
        return Ok(());
    }

    let rows: Vec<AssetRow> = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| AssetRow::new(i + 1, asset))
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}
