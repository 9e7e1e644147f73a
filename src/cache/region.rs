//! Cache Region Module
//!
//! The static region table: one region per cached read query, each with a
//! fixed key and a fixed expiration policy. Callers name regions, never keys.

use std::fmt;
use std::time::Duration;

use crate::cache::EntryOptions;

// == Key Names ==
pub const INVENTORY_KEY: &str = "inventory_items";
pub const ALL_ORDERS_KEY: &str = "all_orders";
pub const RECENT_ORDERS_KEY: &str = "recent_orders";
/// Prefix of every per-order key; also the bulk invalidation pattern.
pub const ORDER_KEY_PREFIX: &str = "order_";

// == Policies ==
/// Inventory listing TTL on the live read path.
pub const INVENTORY_READ_TTL: Duration = Duration::from_secs(30);
/// Inventory listing TTL when populated at startup.
///
/// Deliberately differs from [`INVENTORY_READ_TTL`]; the two call sites keep
/// their own values.
pub const INVENTORY_WARMUP_TTL: Duration = Duration::from_secs(60 * 60);
pub const ALL_ORDERS_TTL: Duration = Duration::from_secs(2 * 60);
pub const ALL_ORDERS_SLIDING: Duration = Duration::from_secs(60);
pub const ORDER_TTL: Duration = Duration::from_secs(5 * 60);
pub const ORDER_SLIDING: Duration = Duration::from_secs(2 * 60);
pub const RECENT_ORDERS_TTL: Duration = Duration::from_secs(30 * 60);
/// Window used by the recent-orders query.
pub const RECENT_ORDERS_DAYS: i64 = 30;

// == Region ==
/// A named cache region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Full inventory listing
    Inventory,
    /// Full order listing
    AllOrders,
    /// A single order by id
    Order(u64),
    /// Orders created within the last [`RECENT_ORDERS_DAYS`] days
    RecentOrders,
}

impl Region {
    /// The cache key for this region.
    pub fn key(&self) -> String {
        match self {
            Region::Inventory => INVENTORY_KEY.to_string(),
            Region::AllOrders => ALL_ORDERS_KEY.to_string(),
            Region::Order(id) => format!("{ORDER_KEY_PREFIX}{id}"),
            Region::RecentOrders => RECENT_ORDERS_KEY.to_string(),
        }
    }

    /// Expiration policy used on the read path.
    pub fn options(&self) -> EntryOptions {
        match self {
            Region::Inventory => EntryOptions::with_default_sliding(INVENTORY_READ_TTL),
            Region::AllOrders => EntryOptions::new(ALL_ORDERS_TTL, Some(ALL_ORDERS_SLIDING)),
            Region::Order(_) => EntryOptions::new(ORDER_TTL, Some(ORDER_SLIDING)),
            Region::RecentOrders => EntryOptions::absolute(RECENT_ORDERS_TTL),
        }
    }

    /// Expiration policy used when the region is populated during warmup.
    pub fn warmup_options(&self) -> EntryOptions {
        match self {
            Region::Inventory => EntryOptions::with_default_sliding(INVENTORY_WARMUP_TTL),
            other => other.options(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
