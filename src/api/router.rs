//! Front-desk router.
//!
//! Layers (outermost → innermost):
//! 1. `Cache-Control: no-store` on every response (patient data)
//! 2. Access logging

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the application router.
pub fn app_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/", post(endpoints::appointments::create))
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/records", get(endpoints::records::list))
        .fallback(endpoints::not_found)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
