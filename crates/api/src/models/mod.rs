pub mod asset;
pub mod scope;

pub use asset::*;
pub use scope::*;
