//! Read-side views over the record store: day grouping and patient search.
//!
//! Recomputed on every call. Record volumes are front-desk sized, so
//! full scans are fine.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::AppointmentRecord;

/// Appointments partitioned by calendar day.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DaySchedule {
    /// Distinct appointment dates, earliest first.
    pub days: Vec<NaiveDate>,
    /// Records per date, in insertion order.
    pub by_day: BTreeMap<NaiveDate, Vec<AppointmentRecord>>,
}

impl DaySchedule {
    pub fn appointments_on(&self, day: &NaiveDate) -> &[AppointmentRecord] {
        self.by_day.get(day).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Group records by the date of their appointment time.
pub fn group_by_day(records: &[AppointmentRecord]) -> DaySchedule {
    let mut by_day: BTreeMap<NaiveDate, Vec<AppointmentRecord>> = BTreeMap::new();
    for record in records {
        by_day
            .entry(record.appointment_date())
            .or_default()
            .push(record.clone());
    }

    let days = by_day.keys().copied().collect();
    DaySchedule { days, by_day }
}

/// Case-insensitive substring search over patient name and contact.
///
/// A missing or empty query returns every record in original order. Any
/// other query, whitespace included, is matched as given.
pub fn search(records: &[AppointmentRecord], query: Option<&str>) -> Vec<AppointmentRecord> {
    let needle = match query {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return records.to_vec(),
    };

    records
        .iter()
        .filter(|r| {
            r.patient_name.to_lowercase().contains(&needle)
                || r.patient_contact.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Records ordered by appointment time (stable for equal times).
pub fn sorted_by_time(records: &[AppointmentRecord]) -> Vec<AppointmentRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.appointment_time.cmp(&b.appointment_time));
    sorted
}
