use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Frontdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Records file, relative to the working directory.
pub const RECORDS_FILE: &str = "patient_records.csv";

/// Local-only web listener (front-desk machine).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Reminder scan period.
pub const REMINDER_INTERVAL_SECS: u64 = 60;

/// How far ahead of `now` an appointment triggers a reminder.
pub const REMINDER_LOOKAHEAD_MINUTES: i64 = 120;

/// Path of the records file.
pub fn records_path() -> PathBuf {
    PathBuf::from(RECORDS_FILE)
}

pub fn bind_addr() -> SocketAddr {
    DEFAULT_BIND_ADDR
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5000)))
}

pub fn reminder_interval() -> Duration {
    Duration::from_secs(REMINDER_INTERVAL_SECS)
}

pub fn reminder_lookahead() -> chrono::Duration {
    chrono::Duration::minutes(REMINDER_LOOKAHEAD_MINUTES)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "frontdesk_lib=info,frontdesk=info,tower_http=warn"
}
