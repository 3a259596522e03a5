pub mod key;
pub mod lru;

pub use key::{RequestKey, content_key};
pub use lru::BoundedLruStore;
