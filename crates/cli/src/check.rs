use bundlescope_core::bundle::BundleLoader;
use bundlescope_core::config::BundlescopeConfig;
use std::path::Path;
use tracing::info;

pub fn run(config: BundlescopeConfig, bundles: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = BundleLoader::read_path(bundles)?;
    info!("Parsed {} bundle definitions", definitions.len());

    let runtime = bundlescope_runtime::build_runtime(config)?;
    runtime.load_bundles()?;
    let report = runtime.loader().load_definitions(definitions)?;

    println!("Bundles:        {}", report.bundles);
    println!("Assets stored:  {}", report.stored);
    println!("Skipped:        {}", report.skipped);
    println!("Scopes:         {}", runtime.registry().scopes().len());
    Ok(())
}
