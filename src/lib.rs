//! Warehouse Cache - read-side cache for an inventory and order service
//!
//! A TTL cache with sliding expiration sits in front of the inventory and
//! order store. Named regions fix key names and TTLs; writes invalidate the
//! regions they touch after committing.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheManager, CacheStore, Region};
pub use config::Config;
pub use repository::Repository;
pub use tasks::spawn_cleanup_task;
