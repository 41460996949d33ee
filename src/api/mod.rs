//! HTTP layer for the front desk.
//!
//! Exposes intake, the day view, record search and a health check.
//! `app_router()` returns a `Router` that can be mounted on any axum
//! server; `server` owns the listener lifecycle.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::app_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
