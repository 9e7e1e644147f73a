//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, create_item_handler, create_order_handler, delete_item_handler,
    delete_order_handler, get_item_handler, get_order_handler, health_handler,
    list_inventory_handler, list_orders_handler, recent_orders_handler, stats_handler,
    update_item_handler, update_order_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|POST /inventory`, `GET|PUT|DELETE /inventory/:id`
/// - `GET|POST /orders`, `GET /orders/recent`, `GET|PUT|DELETE /orders/:id`
/// - `POST /admin/cache/clear`, `GET /admin/cache/stats`
/// - `GET /health`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/inventory",
            get(list_inventory_handler).post(create_item_handler),
        )
        .route(
            "/inventory/:id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .route("/orders", get(list_orders_handler).post(create_order_handler))
        .route("/orders/recent", get(recent_orders_handler))
        .route(
            "/orders/:id",
            get(get_order_handler)
                .put(update_order_handler)
                .delete(delete_order_handler),
        )
        .route("/admin/cache/clear", post(clear_cache_handler))
        .route("/admin/cache/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
