use bundlescope_core::config::BundlescopeConfig;
use bundlescope_core::resolver::RequestContext;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CacheRow {
    #[tabled(rename = "Cache")]
    name: String,
    #[tabled(rename = "Entries")]
    entries: String,
    #[tabled(rename = "Hits")]
    hits: u64,
    #[tabled(rename = "Misses")]
    misses: u64,
    #[tabled(rename = "Evictions")]
    evictions: u64,
}

pub fn run(
    config: BundlescopeConfig,
    bundles: &Path,
    scopes: &[String],
    context_path: &str,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = crate::open_runtime(config, bundles)?;
    let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
    let ctx = RequestContext::new(context_path, "");

    let html = runtime.resolver().render(&ctx, &scopes)?;
    println!("{}", html);

    if stats {
        let rows: Vec<CacheRow> = runtime
            .cache_stats()
            .into_iter()
            .map(|s| CacheRow {
                name: s.name,
                entries: format!("{}/{}", s.entries, s.capacity),
                hits: s.hits,
                misses: s.misses,
                evictions: s.evictions,
            })
            .collect();
        eprintln!("{}", Table::new(rows));
    }
    Ok(())
}
