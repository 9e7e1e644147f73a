//! Cache Module
//!
//! Read-side cache in front of the inventory and order store: a TTL store with
//! sliding expiration plus a region layer that owns key naming and invalidation.

mod clock;
mod entry;
mod lru;
mod manager;
pub mod region;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{default_sliding_window, CacheEntry, EntryOptions};
pub use lru::LruTracker;
pub use manager::{CacheManager, WarmupReport, WarmupSource};
pub use region::Region;
pub use stats::CacheStats;
pub use store::{CacheStatus, CacheStore};
