//! Appointment intake: form validation, normalization and write-through.

use serde::Deserialize;

use crate::core_state::{CoreError, CoreState};
use crate::models::{parse_form_time, AppointmentRecord};

/// Raw intake submission. Field names match the web form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    /// `YYYY-MM-DDTHH:MM`
    pub appointment_time: Option<String>,
    pub address: Option<String>,
    pub appointment_for: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),
    #[error("Invalid appointment time {value:?}, expected YYYY-MM-DDTHH:MM")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid submission: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Turn a form submission into a record. Builds nothing on failure.
pub fn normalize(form: AppointmentForm) -> Result<AppointmentRecord, ValidationError> {
    let patient_name = required(form.patient_name, "patient_name")?;
    if patient_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("patient_name"));
    }
    let patient_contact = required(form.patient_contact, "patient_contact")?;
    let raw_time = required(form.appointment_time, "appointment_time")?;
    let address = required(form.address, "address")?;
    let appointment_for = required(form.appointment_for, "appointment_for")?;
    let status = required(form.status, "status")?;

    // chrono skips whitespace ahead of numeric fields; the form layout has none.
    if raw_time.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidTimestamp { value: raw_time });
    }
    let appointment_time = parse_form_time(&raw_time)
        .map_err(|_| ValidationError::InvalidTimestamp { value: raw_time })?;

    Ok(AppointmentRecord {
        patient_name,
        patient_contact,
        appointment_time,
        address,
        appointment_for,
        status,
    })
}

/// Validate a submission and persist it (disk, then memory).
pub fn submit(core: &CoreState, form: AppointmentForm) -> Result<AppointmentRecord, IntakeError> {
    let record = normalize(form).inspect_err(|e| {
        tracing::info!(error = %e, "Appointment submission rejected");
    })?;

    core.record_appointment(record.clone())?;
    Ok(record)
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}
