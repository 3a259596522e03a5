pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod resolver;
pub mod scope;

pub use error::{BundlescopeError, Result};
