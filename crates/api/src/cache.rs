use serde::{Deserialize, Serialize};

/// Counters for one bounded cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub name: String,
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Administrative view of a cache
pub trait CacheManager: Send + Sync {
    fn stats(&self) -> CacheStats;

    /// Drop every entry. Counters are kept.
    fn clear(&self);
}
