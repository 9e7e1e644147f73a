//! Cache Manager Module
//!
//! Region policy layer over [`CacheStore`]. Owns no data: it maps regions to
//! keys and TTLs and exposes one invalidation entry point per write path.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::cache::region::ORDER_KEY_PREFIX;
use crate::cache::{CacheStats, CacheStatus, CacheStore, Region};

// == Warmup Source ==
/// Backing-store access used to populate regions at startup.
#[async_trait]
pub trait WarmupSource<V: Send>: Send + Sync {
    /// Value for [`Region::Inventory`].
    async fn load_inventory(&self) -> anyhow::Result<V>;

    /// Value for [`Region::RecentOrders`].
    async fn load_recent_orders(&self) -> anyhow::Result<V>;
}

/// Outcome of a warmup run, by cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub warmed: Vec<String>,
    pub failed: Vec<String>,
}

// == Cache Manager ==
#[derive(Debug, Clone)]
pub struct CacheManager<V> {
    store: Arc<CacheStore<V>>,
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync,
{
    pub fn new(store: Arc<CacheStore<V>>) -> Self {
        Self { store }
    }

    /// The underlying store, for callers that need raw key access.
    pub fn store(&self) -> &Arc<CacheStore<V>> {
        &self.store
    }

    // == Region Access ==
    pub async fn get_region(&self, region: Region) -> Option<V> {
        self.store.get(&region.key()).await
    }

    /// Stores `value` under the region's read-path policy.
    pub async fn set_region(&self, region: Region, value: V) {
        self.store
            .set_with(region.key(), value, region.options())
            .await;
    }

    /// Read-through lookup for a region, reporting HIT/MISS.
    ///
    /// Same contract as [`CacheStore::get_or_set_with`]: duplicate concurrent
    /// computation is possible and a compute error is returned unchanged.
    pub async fn get_or_set_region<F, Fut, E>(
        &self,
        region: Region,
        compute: F,
    ) -> Result<(V, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.store
            .get_or_set_with(&region.key(), region.options(), compute)
            .await
    }

    // == Invalidation ==
    /// Drops the inventory listing. Call after an inventory write commits.
    pub async fn invalidate_inventory(&self) {
        let removed = self.store.remove(&Region::Inventory.key()).await;
        info!(region = %Region::Inventory, removed, "Inventory cache invalidated");
    }

    /// Drops both order listings and, if given, the single-order entry.
    ///
    /// Call after an order write commits.
    pub async fn invalidate_orders(&self, order_id: Option<u64>) {
        self.store.remove(&Region::AllOrders.key()).await;
        self.store.remove(&Region::RecentOrders.key()).await;
        if let Some(id) = order_id {
            self.store.remove(&Region::Order(id).key()).await;
        }
        info!(order_id = ?order_id, "Order caches invalidated");
    }

    /// Drops every region, including all per-order entries.
    pub async fn invalidate_all(&self) {
        self.invalidate_inventory().await;
        self.invalidate_orders(None).await;
        let removed = self.store.remove_by_pattern(ORDER_KEY_PREFIX).await;
        info!(order_entries = removed, "All caches invalidated");
    }

    // == Warmup ==
    /// Populates the inventory and recent-orders regions with their warmup TTLs.
    ///
    /// Never fails: a region whose load errors is logged and left cold.
    pub async fn warmup<S>(&self, source: &S) -> WarmupReport
    where
        S: WarmupSource<V> + ?Sized,
    {
        let mut report = WarmupReport::default();

        let inventory = source.load_inventory().await;
        self.warm_region(Region::Inventory, inventory, &mut report).await;

        let recent = source.load_recent_orders().await;
        self.warm_region(Region::RecentOrders, recent, &mut report).await;

        info!(
            warmed = report.warmed.len(),
            failed = report.failed.len(),
            "Cache warmup finished"
        );
        report
    }

    async fn warm_region(
        &self,
        region: Region,
        loaded: anyhow::Result<V>,
        report: &mut WarmupReport,
    ) {
        match loaded {
            Ok(value) => {
                self.store
                    .set_with(region.key(), value, region.warmup_options())
                    .await;
                report.warmed.push(region.key());
            }
            Err(err) => {
                warn!(
                    region = %region,
                    error = %format!("{err:#}"),
                    "Cache warmup failed, region left cold"
                );
                report.failed.push(region.key());
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::region::{INVENTORY_READ_TTL, INVENTORY_WARMUP_TTL};
    use crate::cache::ManualClock;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    fn manager() -> (CacheManager<String>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = CacheStore::new().with_clock(Arc::new(clock.clone()));
        (CacheManager::new(Arc::new(store)), clock)
    }

    async fn seed(manager: &CacheManager<String>, keys: &[&str]) {
        for key in keys {
            manager.store().set(*key, key.to_string(), HOUR, None).await;
        }
    }

    struct StaticSource {
        inventory: Option<&'static str>,
        recent: Option<&'static str>,
    }

    #[async_trait]
    impl WarmupSource<String> for StaticSource {
        async fn load_inventory(&self) -> anyhow::Result<String> {
            self.inventory
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("inventory table unavailable"))
        }

        async fn load_recent_orders(&self) -> anyhow::Result<String> {
            self.recent
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("orders table unavailable"))
        }
    }

    #[tokio::test]
    async fn test_invalidate_inventory() {
        let (manager, _) = manager();
        manager
            .set_region(Region::Inventory, "items".to_string())
            .await;

        manager.invalidate_inventory().await;

        assert_eq!(manager.get_region(Region::Inventory).await, None);
        // idempotent
        manager.invalidate_inventory().await;
    }

    #[tokio::test]
    async fn test_invalidate_orders_with_id() {
        let (manager, _) = manager();
        seed(
            &manager,
            &["all_orders", "recent_orders", "order_5", "order_6", "inventory_items"],
        )
        .await;

        manager.invalidate_orders(Some(5)).await;

        assert_eq!(
            manager.store().keys().await,
            vec!["inventory_items", "order_6"]
        );
    }

    #[tokio::test]
    async fn test_invalidate_orders_without_id_keeps_single_orders() {
        let (manager, _) = manager();
        seed(&manager, &["all_orders", "recent_orders", "order_1"]).await;

        manager.invalidate_orders(None).await;

        assert_eq!(manager.store().keys().await, vec!["order_1"]);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let (manager, _) = manager();
        seed(
            &manager,
            &["inventory_items", "all_orders", "order_3", "order_7"],
        )
        .await;

        manager.invalidate_all().await;

        assert!(manager.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_get_or_set_region_uses_region_key() {
        let (manager, _) = manager();

        let (value, status) = manager
            .get_or_set_region(Region::Order(9), || async {
                Ok::<_, ()>("order nine".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "order nine");
        assert_eq!(status, CacheStatus::Miss);
        assert!(manager.store().exists("order_9").await);
    }

    #[tokio::test]
    async fn test_inventory_read_path_expires_after_30s() {
        let (manager, clock) = manager();
        manager
            .set_region(Region::Inventory, "items".to_string())
            .await;

        clock.advance(INVENTORY_READ_TTL);

        assert_eq!(manager.get_region(Region::Inventory).await, None);
    }

    #[tokio::test]
    async fn test_warmup_populates_with_long_ttl() {
        let (manager, clock) = manager();
        let source = StaticSource {
            inventory: Some("items"),
            recent: Some("recent"),
        };

        let report = manager.warmup(&source).await;

        assert_eq!(report.warmed, vec!["inventory_items", "recent_orders"]);
        assert!(report.failed.is_empty());

        // still live well past the 30s read-path TTL as long as it keeps being read
        for _ in 0..3 {
            clock.advance(Duration::from_secs(15 * 60));
            assert_eq!(
                manager.get_region(Region::Inventory).await,
                Some("items".to_string())
            );
        }
        clock.advance(INVENTORY_WARMUP_TTL / 4);
        assert_eq!(manager.get_region(Region::Inventory).await, None);
    }

    #[tokio::test]
    async fn test_warmup_failure_is_swallowed() {
        let (manager, _) = manager();
        let source = StaticSource {
            inventory: None,
            recent: Some("recent"),
        };

        let report = manager.warmup(&source).await;

        assert_eq!(report.warmed, vec!["recent_orders"]);
        assert_eq!(report.failed, vec!["inventory_items"]);
        assert_eq!(manager.get_region(Region::Inventory).await, None);
        assert_eq!(
            manager.get_region(Region::RecentOrders).await,
            Some("recent".to_string())
        );
    }
}
