//! API Module
//!
//! HTTP handlers and routing. These are the cache's callers: read endpoints
//! go through a cache region, write endpoints invalidate after committing.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
