pub mod cache;
pub mod error;
pub mod models;
pub mod registry;

// Re-export commonly used types
pub use cache::{CacheManager, CacheStats};
pub use error::{RegistryError, RegistryResult};
pub use models::*;
pub use registry::{AssetRegistry, SkipReason, StoreOutcome};
