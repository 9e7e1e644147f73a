//! Customer order record and its write requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::inventory::validate_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// One inventory item and the quantity ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    /// Warehouse the order ships from
    pub warehouse: String,
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /orders`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub customer: String,
    pub warehouse: String,
    pub lines: Vec<OrderLine>,
    /// Original placement time for imported orders; defaults to now
    #[serde(default)]
    pub placed_at: Option<DateTime<Utc>>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Option<String> {
        validate_text("customer", &self.customer)
            .or_else(|| validate_text("warehouse", &self.warehouse))
            .or_else(|| validate_lines(&self.lines))
    }
}

/// Request body for `PUT /orders/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub lines: Option<Vec<OrderLine>>,
}

impl UpdateOrderRequest {
    pub fn validate(&self) -> Option<String> {
        self.lines.as_deref().and_then(validate_lines)
    }
}

fn validate_lines(lines: &[OrderLine]) -> Option<String> {
    if lines.is_empty() {
        return Some("order must have at least one line".to_string());
    }
    if lines.iter().any(|line| line.quantity == 0) {
        return Some("line quantity must be positive".to_string());
    }
    None
}
