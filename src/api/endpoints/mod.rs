//! API endpoint handlers. Thin wrappers over intake and query.

pub mod appointments;
pub mod health;
pub mod records;

use crate::api::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
