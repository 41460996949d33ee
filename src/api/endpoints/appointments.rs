//! Appointment endpoints.
//!
//! - `POST /` and `POST /appointments`: intake form submission
//! - `GET /appointments`: appointments grouped by day, earliest day first

use axum::extract::State;
use axum::response::Redirect;
use axum::{Form, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::intake::{self, AppointmentForm};
use crate::models::AppointmentRecord;
use crate::query;

#[derive(Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub appointments: Vec<AppointmentRecord>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub days: Vec<DayGroup>,
}

/// `POST /appointments`: record a new appointment, then show the day view.
pub async fn create(
    State(ctx): State<ApiContext>,
    Form(form): Form<AppointmentForm>,
) -> Result<Redirect, ApiError> {
    intake::submit(&ctx.core, form)?;
    Ok(Redirect::to("/appointments"))
}

/// `GET /appointments`: day view.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<AppointmentsResponse>, ApiError> {
    let schedule = ctx.core.store().with_records(query::group_by_day)?;

    let days = schedule
        .days
        .iter()
        .map(|date| DayGroup {
            date: *date,
            appointments: schedule.appointments_on(date).to_vec(),
        })
        .collect();

    Ok(Json(AppointmentsResponse { days }))
}
