//! `GET /records?search=&order=`: patient record search.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::AppointmentRecord;
use crate::query;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrder {
    /// Order of intake.
    #[default]
    Insertion,
    /// By appointment time, earliest first.
    Time,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecordsParams {
    pub search: Option<String>,
    #[serde(default)]
    pub order: RecordOrder,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub query: Option<String>,
    pub count: usize,
    pub records: Vec<AppointmentRecord>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Query(params): Query<RecordsParams>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let mut records = ctx
        .core
        .store()
        .with_records(|records| query::search(records, params.search.as_deref()))?;

    if params.order == RecordOrder::Time {
        records = query::sorted_by_time(&records);
    }

    Ok(Json(RecordsResponse {
        query: params.search,
        count: records.len(),
        records,
    }))
}
