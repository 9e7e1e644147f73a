//! Domain records and request/response DTOs
//!
//! Inventory items and orders are what the backing store holds; the response
//! types cover the health and cache administration endpoints.

pub mod inventory;
pub mod order;
pub mod responses;

// Re-export commonly used types
pub use inventory::{CreateItemRequest, InventoryItem, UpdateItemRequest};
pub use order::{CreateOrderRequest, Order, OrderLine, OrderStatus, UpdateOrderRequest};
pub use responses::{
    ClearCacheResponse, DeleteResponse, ErrorResponse, HealthResponse, StatsResponse,
};
