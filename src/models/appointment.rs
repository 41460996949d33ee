use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the records file and in reminder payloads.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Timestamp layout sent by the intake form (`datetime-local` input).
pub const FORM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One patient appointment. Created once at intake, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub patient_name: String,
    pub patient_contact: String,
    #[serde(with = "record_time")]
    pub appointment_time: NaiveDateTime,
    pub address: String,
    pub appointment_for: String,
    pub status: String,
}

impl AppointmentRecord {
    /// Calendar day of the appointment.
    pub fn appointment_date(&self) -> NaiveDate {
        self.appointment_time.date()
    }

    /// `YYYY-MM-DD HH:MM`, as persisted and as shown in reminders.
    pub fn formatted_time(&self) -> String {
        format_record_time(&self.appointment_time)
    }
}

pub fn format_record_time(time: &NaiveDateTime) -> String {
    time.format(RECORD_TIME_FORMAT).to_string()
}

pub fn parse_record_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, RECORD_TIME_FORMAT)
}

pub fn parse_form_time(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, FORM_TIME_FORMAT)
}

/// Serde adapter keeping JSON timestamps in the records-file layout.
mod record_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_record_time(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_record_time(&raw).map_err(serde::de::Error::custom)
    }
}
