//! API Handlers
//!
//! Read handlers go through the cache region for their query and report
//! HIT/MISS; write handlers commit to the repository first and invalidate the
//! affected regions only once the commit has succeeded.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::region::RECENT_ORDERS_DAYS;
use crate::cache::{CacheManager, CacheStatus, CacheStore, Region};
use crate::config::Config;
use crate::error::{Result, ServiceError};
use crate::models::{
    ClearCacheResponse, CreateItemRequest, CreateOrderRequest, DeleteResponse, HealthResponse,
    InventoryItem, Order, StatsResponse, UpdateItemRequest, UpdateOrderRequest,
};
use crate::repository::Repository;

/// Response header carrying `HIT` or `MISS`
pub const CACHE_STATUS_HEADER: &str = "x-cache";
/// Response header carrying the handler's elapsed time in milliseconds
pub const CACHE_ELAPSED_HEADER: &str = "x-cache-elapsed-ms";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Region cache over a single process-wide store
    pub cache: CacheManager<Value>,
    /// Backing store
    pub repo: Repository,
}

impl AppState {
    pub fn new(cache: CacheManager<Value>, repo: Repository) -> Self {
        Self { cache, repo }
    }

    /// Builds the cache store and an empty repository from configuration.
    pub fn from_config(config: &Config) -> Self {
        let store = CacheStore::with_max_entries(config.cache_capacity());
        Self::new(CacheManager::new(Arc::new(store)), Repository::new())
    }
}

type CachedJson = (HeaderMap, Json<Value>);

fn cache_headers(status: CacheStatus, started: Instant) -> HeaderMap {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str()));
    headers.insert(CACHE_ELAPSED_HEADER, HeaderValue::from(elapsed_ms));
    headers
}

fn validated(error: Option<String>) -> Result<()> {
    match error {
        Some(msg) => Err(ServiceError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

// == Inventory ==

/// Handler for GET /inventory
pub async fn list_inventory_handler(State(state): State<AppState>) -> Result<CachedJson> {
    let started = Instant::now();
    let repo = state.repo.clone();

    let (body, status) = state
        .cache
        .get_or_set_region(Region::Inventory, || async move {
            Ok::<_, ServiceError>(serde_json::to_value(repo.list_items().await)?)
        })
        .await?;

    Ok((cache_headers(status, started), Json(body)))
}

/// Handler for GET /inventory/:id
///
/// No region covers single items, so this always reads the repository.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<InventoryItem>> {
    Ok(Json(state.repo.get_item(id).await?))
}

/// Handler for POST /inventory
pub async fn create_item_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<InventoryItem>)> {
    validated(req.validate())?;

    let item = state.repo.create_item(req).await?;
    state.cache.invalidate_inventory().await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for PUT /inventory/:id
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<InventoryItem>> {
    validated(req.validate())?;

    let item = state.repo.update_item(id, req).await?;
    state.cache.invalidate_inventory().await;

    Ok(Json(item))
}

/// Handler for DELETE /inventory/:id
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state.repo.delete_item(id).await?;
    state.cache.invalidate_inventory().await;

    Ok(Json(DeleteResponse::new("Inventory item", id)))
}

// == Orders ==

/// Handler for GET /orders
pub async fn list_orders_handler(State(state): State<AppState>) -> Result<CachedJson> {
    let started = Instant::now();
    let repo = state.repo.clone();

    let (body, status) = state
        .cache
        .get_or_set_region(Region::AllOrders, || async move {
            Ok::<_, ServiceError>(serde_json::to_value(repo.list_orders().await)?)
        })
        .await?;

    Ok((cache_headers(status, started), Json(body)))
}

/// Handler for GET /orders/recent
pub async fn recent_orders_handler(State(state): State<AppState>) -> Result<CachedJson> {
    let started = Instant::now();
    let repo = state.repo.clone();

    let (body, status) = state
        .cache
        .get_or_set_region(Region::RecentOrders, || async move {
            let recent = repo.recent_orders(RECENT_ORDERS_DAYS).await;
            Ok::<_, ServiceError>(serde_json::to_value(recent)?)
        })
        .await?;

    Ok((cache_headers(status, started), Json(body)))
}

/// Handler for GET /orders/:id
///
/// An unknown id surfaces as 404 and leaves nothing in the cache.
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<CachedJson> {
    let started = Instant::now();
    let repo = state.repo.clone();

    let (body, status) = state
        .cache
        .get_or_set_region(Region::Order(id), || async move {
            let order = repo.get_order(id).await?;
            Ok::<_, ServiceError>(serde_json::to_value(order)?)
        })
        .await?;

    Ok((cache_headers(status, started), Json(body)))
}

/// Handler for POST /orders
pub async fn create_order_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    validated(req.validate())?;

    let order = state.repo.create_order(req).await?;
    state.cache.invalidate_orders(Some(order.id)).await;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for PUT /orders/:id
pub async fn update_order_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Order>> {
    validated(req.validate())?;

    let order = state.repo.update_order(id, req).await?;
    state.cache.invalidate_orders(Some(id)).await;

    Ok(Json(order))
}

/// Handler for DELETE /orders/:id
pub async fn delete_order_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state.repo.delete_order(id).await?;
    state.cache.invalidate_orders(Some(id)).await;

    Ok(Json(DeleteResponse::new("Order", id)))
}

// == Admin ==

/// Handler for POST /admin/cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    state.cache.invalidate_all().await;
    info!("Cache cleared by admin request");
    Json(ClearCacheResponse::now())
}

/// Handler for GET /admin/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
