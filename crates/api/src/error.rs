use crate::models::Asset;

/// Failures raised by the scope registry.
///
/// Only [`RegistryError::AssetAlreadyExistsInScope`] is recoverable: it
/// carries the asset that was seen first so the caller can decide on a
/// remediation (for example introducing an intermediate scope). Hierarchy
/// violations mean the bundle configuration itself is wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Parent scope '{parent}' of '{scope}' is not defined")]
    UndefinedParentScope { scope: String, parent: String },

    #[error(
        "Scope '{scope}' already has parent '{existing}', cannot re-attach it to '{requested}'"
    )]
    ParentScopeIncompatibility {
        scope: String,
        existing: String,
        requested: String,
    },

    #[error("Asset '{}' already exists in scope '{scope}' as {original}, conflicting with {conflicting}", .original.name)]
    AssetAlreadyExistsInScope {
        scope: String,
        original: Box<Asset>,
        conflicting: Box<Asset>,
    },

    #[error("Asset '{asset}' cannot be stored in the detached scope")]
    DetachScopeNotAllowed { asset: String },

    #[error("Unknown scope: {0}")]
    UnknownScope(String),
}

impl RegistryError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RegistryError::AssetAlreadyExistsInScope { .. })
    }

    /// The first-seen asset of a conflict.
    pub fn original_asset(&self) -> Option<&Asset> {
        match self {
            RegistryError::AssetAlreadyExistsInScope { original, .. } => Some(original),
            _ => None,
        }
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
