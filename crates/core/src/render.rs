//! Turning assets into markup.
//!
//! Location resolution and tag rendering are deliberately small: template
//! integrations plug in their own [`TagRenderer`].

use crate::config::{LocationPolicy, RenderConfig};
use bundlescope_api::{Asset, AssetType};

/// Picks the URL an asset is served from
#[derive(Debug, Clone)]
pub struct LocationResolver {
    policy: LocationPolicy,
    local_prefix: String,
}

impl LocationResolver {
    pub fn new(policy: LocationPolicy, local_prefix: &str) -> Self {
        let trimmed = local_prefix.trim_matches('/');
        let local_prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self {
            policy,
            local_prefix,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.location_policy, &config.local_prefix)
    }

    pub fn resolve(&self, context_path: &str, asset: &Asset) -> Option<String> {
        let local = || asset.local().map(|l| self.local_url(context_path, l));
        let remote = || asset.remote().map(str::to_string);
        match self.policy {
            LocationPolicy::RemoteFirst => remote().or_else(local),
            LocationPolicy::LocalFirst => local().or_else(remote),
        }
    }

    fn local_url(&self, context_path: &str, local: &str) -> String {
        format!(
            "{}{}/{}",
            context_path.trim_end_matches('/'),
            self.local_prefix,
            local.trim_start_matches('/')
        )
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

pub trait TagRenderer: Send + Sync {
    fn render(&self, asset: &Asset, location: &str) -> String;
}

/// Plain HTML tags
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTagRenderer;

impl TagRenderer for HtmlTagRenderer {
    fn render(&self, asset: &Asset, location: &str) -> String {
        let src = escape_attr(location);
        match asset.asset_type {
            Some(AssetType::Script) => format!(r#"<script src="{src}"></script>"#),
            Some(AssetType::Stylesheet) => format!(r#"<link rel="stylesheet" href="{src}">"#),
            Some(AssetType::Image) => {
                format!(r#"<img src="{src}" alt="{}">"#, escape_attr(&asset.name))
            }
            None => String::new(),
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
