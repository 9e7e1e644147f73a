//! Repository Module
//!
//! In-memory backing store for inventory items and orders. Every cached read
//! is recomputed from here on a miss, and every write commits here before the
//! matching cache region is invalidated.

mod store;

pub use store::Repository;
