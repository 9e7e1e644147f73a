//! Inventory and order tables behind a single lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::region::RECENT_ORDERS_DAYS;
use crate::cache::WarmupSource;
use crate::error::{Result, ServiceError};
use crate::models::{
    CreateItemRequest, CreateOrderRequest, InventoryItem, Order, OrderLine, OrderStatus,
    UpdateItemRequest, UpdateOrderRequest,
};

#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<u64, InventoryItem>,
    orders: BTreeMap<u64, Order>,
    next_item_id: u64,
    next_order_id: u64,
}

impl Tables {
    fn check_lines(&self, lines: &[OrderLine]) -> Result<()> {
        match lines.iter().find(|line| !self.items.contains_key(&line.item_id)) {
            Some(line) => Err(ServiceError::InvalidRequest(format!(
                "unknown inventory item {}",
                line.item_id
            ))),
            None => Ok(()),
        }
    }
}

// == Repository ==
/// Cheaply cloneable handle to the shared tables.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    tables: Arc<RwLock<Tables>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    // == Inventory ==
    /// All items ordered by id.
    pub async fn list_items(&self) -> Vec<InventoryItem> {
        self.tables.read().await.items.values().cloned().collect()
    }

    pub async fn get_item(&self, id: u64) -> Result<InventoryItem> {
        self.tables
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| item_not_found(id))
    }

    pub async fn create_item(&self, req: CreateItemRequest) -> Result<InventoryItem> {
        let mut tables = self.tables.write().await;

        if tables.items.values().any(|item| item.sku == req.sku) {
            return Err(ServiceError::InvalidRequest(format!(
                "sku {} already exists",
                req.sku
            )));
        }

        tables.next_item_id += 1;
        let item = InventoryItem {
            id: tables.next_item_id,
            sku: req.sku,
            name: req.name,
            warehouse: req.warehouse,
            quantity: req.quantity,
            unit_price: req.unit_price,
            updated_at: Utc::now(),
        };
        tables.items.insert(item.id, item.clone());

        debug!(item_id = item.id, "Inventory item created");
        Ok(item)
    }

    pub async fn update_item(&self, id: u64, req: UpdateItemRequest) -> Result<InventoryItem> {
        let mut tables = self.tables.write().await;
        let item = tables.items.get_mut(&id).ok_or_else(|| item_not_found(id))?;

        if let Some(name) = req.name {
            item.name = name;
        }
        if let Some(warehouse) = req.warehouse {
            item.warehouse = warehouse;
        }
        if let Some(quantity) = req.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_price) = req.unit_price {
            item.unit_price = unit_price;
        }
        item.updated_at = Utc::now();

        debug!(item_id = id, "Inventory item updated");
        Ok(item.clone())
    }

    pub async fn delete_item(&self, id: u64) -> Result<()> {
        let mut tables = self.tables.write().await;

        let referenced = tables
            .orders
            .values()
            .any(|order| order.lines.iter().any(|line| line.item_id == id));
        if referenced {
            return Err(ServiceError::InvalidRequest(format!(
                "inventory item {id} is referenced by an order"
            )));
        }

        tables
            .items
            .remove(&id)
            .map(|_| debug!(item_id = id, "Inventory item deleted"))
            .ok_or_else(|| item_not_found(id))
    }

    // == Orders ==
    /// All orders ordered by id.
    pub async fn list_orders(&self) -> Vec<Order> {
        self.tables.read().await.orders.values().cloned().collect()
    }

    pub async fn get_order(&self, id: u64) -> Result<Order> {
        self.tables
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| order_not_found(id))
    }

    /// Orders created within the last `days` days, newest first.
    pub async fn recent_orders(&self, days: i64) -> Vec<Order> {
        let cutoff = Utc::now() - ChronoDuration::days(days);
        let tables = self.tables.read().await;
        let mut recent: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.created_at >= cutoff)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        recent
    }

    pub async fn create_order(&self, req: CreateOrderRequest) -> Result<Order> {
        let mut tables = self.tables.write().await;
        tables.check_lines(&req.lines)?;

        tables.next_order_id += 1;
        let order = Order {
            id: tables.next_order_id,
            customer: req.customer,
            warehouse: req.warehouse,
            lines: req.lines,
            status: OrderStatus::Pending,
            created_at: req.placed_at.unwrap_or_else(Utc::now),
        };
        tables.orders.insert(order.id, order.clone());

        debug!(order_id = order.id, "Order created");
        Ok(order)
    }

    pub async fn update_order(&self, id: u64, req: UpdateOrderRequest) -> Result<Order> {
        let mut tables = self.tables.write().await;
        if let Some(lines) = &req.lines {
            tables.check_lines(lines)?;
        }

        let order = tables
            .orders
            .get_mut(&id)
            .ok_or_else(|| order_not_found(id))?;
        if let Some(status) = req.status {
            order.status = status;
        }
        if let Some(lines) = req.lines {
            order.lines = lines;
        }

        debug!(order_id = id, "Order updated");
        Ok(order.clone())
    }

    pub async fn delete_order(&self, id: u64) -> Result<()> {
        self.tables
            .write()
            .await
            .orders
            .remove(&id)
            .map(|_| debug!(order_id = id, "Order deleted"))
            .ok_or_else(|| order_not_found(id))
    }
}

fn item_not_found(id: u64) -> ServiceError {
    ServiceError::NotFound(format!("Inventory item {id}"))
}

fn order_not_found(id: u64) -> ServiceError {
    ServiceError::NotFound(format!("Order {id}"))
}

// == Warmup Source ==
#[async_trait]
impl WarmupSource<Value> for Repository {
    async fn load_inventory(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self.list_items().await)?)
    }

    async fn load_recent_orders(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(
            self.recent_orders(RECENT_ORDERS_DAYS).await,
        )?)
    }
}
