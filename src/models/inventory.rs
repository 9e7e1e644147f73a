//! Inventory item record and its write requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of SKU and name fields
pub const MAX_FIELD_LENGTH: usize = 128;

/// A stock-keeping unit held in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub sku: String,
    pub name: String,
    pub warehouse: String,
    pub quantity: u32,
    /// Unit price in cents
    pub unit_price: u64,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /inventory`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub sku: String,
    pub name: String,
    pub warehouse: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: u64,
}

impl CreateItemRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_text("sku", &self.sku)
            .or_else(|| validate_text("name", &self.name))
            .or_else(|| validate_text("warehouse", &self.warehouse))
    }
}

/// Request body for `PUT /inventory/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit_price: Option<u64>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Option<String> {
        self.name
            .as_deref()
            .and_then(|name| validate_text("name", name))
            .or_else(|| {
                self.warehouse
                    .as_deref()
                    .and_then(|warehouse| validate_text("warehouse", warehouse))
            })
    }
}

pub(crate) fn validate_text(field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{field} cannot be empty"));
    }
    if value.len() > MAX_FIELD_LENGTH {
        return Some(format!(
            "{field} exceeds maximum length of {MAX_FIELD_LENGTH} characters"
        ));
    }
    None
}
