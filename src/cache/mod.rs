pub mod hash;
pub mod storage;
pub mod store;

pub use hash::{compute_hash, derive_key};
pub use storage::{LocalFileStorage, StoredFile};
pub use store::{CacheConfig, CacheEntry, CacheStats, CacheStore, CleanupReport, CleanupSchedule};
