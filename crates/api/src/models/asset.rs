use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of static asset a page can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Script,
    Stylesheet,
    Image,
}

impl AssetType {
    /// Parse a lowercase type name
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "script" => Some(AssetType::Script),
            "stylesheet" => Some(AssetType::Stylesheet),
            "image" => Some(AssetType::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Script => "script",
            AssetType::Stylesheet => "stylesheet",
            AssetType::Image => "image",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A static asset declaration.
///
/// Identity is the `name` alone: two assets with the same name are the same
/// asset as far as scoping is concerned, even when version, type or location
/// differ. `PartialEq` compares full values; use [`Asset::same_identity`]
/// when only identity matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// `None` for a missing, empty or unrecognised type, which makes the
    /// asset invalid instead of failing the whole bundle.
    #[serde(rename = "type", default, deserialize_with = "lenient_asset_type")]
    pub asset_type: Option<AssetType>,
    #[serde(rename = "remote", default, skip_serializing_if = "Option::is_none")]
    pub remote_location: Option<String>,
    #[serde(rename = "local", default, skip_serializing_if = "Option::is_none")]
    pub local_location: Option<String>,
}

fn lenient_asset_type<'de, D>(deserializer: D) -> Result<Option<AssetType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(AssetType::parse))
}

impl Asset {
    pub fn new(name: impl Into<String>, version: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            asset_type: Some(asset_type),
            remote_location: None,
            local_location: None,
        }
    }

    pub fn with_remote(mut self, location: impl Into<String>) -> Self {
        self.remote_location = Some(location.into());
        self
    }

    pub fn with_local(mut self, location: impl Into<String>) -> Self {
        self.local_location = Some(location.into());
        self
    }

    pub fn remote(&self) -> Option<&str> {
        self.remote_location.as_deref().filter(|s| !s.is_empty())
    }

    pub fn local(&self) -> Option<&str> {
        self.local_location.as_deref().filter(|s| !s.is_empty())
    }

    /// Name, version and type are set and at least one location is present.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.version.is_empty()
            && self.asset_type.is_some()
            && (self.remote().is_some() || self.local().is_some())
    }

    pub fn identity(&self) -> &str {
        &self.name
    }

    pub fn same_identity(&self, other: &Asset) -> bool {
        self.name == other.name
    }

    /// Same identity declared with a different version or type.
    pub fn conflicts_with(&self, other: &Asset) -> bool {
        self.same_identity(other)
            && (self.version != other.version || self.asset_type != other.asset_type)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.asset_type {
            Some(t) => write!(f, "{}@{} ({})", self.name, self.version, t),
            None => write!(f, "{}@{}", self.name, self.version),
        }
    }
}
