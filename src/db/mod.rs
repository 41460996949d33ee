pub mod records_file;

pub use records_file::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed records file: {0}")]
    Format(String),

    #[error("Malformed appointment time on line {line}: {value:?}")]
    MalformedTimestamp { line: u64, value: String },
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => StorageError::Io(io),
            other => StorageError::Format(format!("{other:?}")),
        }
    }
}
