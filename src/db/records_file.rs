//! Records file: the on-disk table behind the record store.
//!
//! One CSV file, header row first, one row per appointment in insertion
//! order. Appends are read-modify-write: every existing row (stray rows
//! included) is read back and the whole table is rewritten through a
//! sibling temp file, then renamed into place.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use super::StorageError;
use crate::models::{format_record_time, parse_record_time, AppointmentRecord};

/// Fixed column order of the records file.
pub const RECORD_COLUMNS: [&str; 6] = [
    "patient_name",
    "patient_contact",
    "appointment_time",
    "address",
    "appointment_for",
    "status",
];

/// Result of a full load: parsed records plus rows that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<AppointmentRecord>,
    /// 1-based line numbers of rows with the wrong column count.
    pub skipped_lines: Vec<u64>,
}

/// Create the records file with its header row. Never touches an existing file.
///
/// Returns `true` when the file was created.
pub fn initialize(path: &Path) -> Result<bool, StorageError> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "Records file already present");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record(RECORD_COLUMNS)?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "Created records file");
    Ok(true)
}

/// Load every record, in file order.
pub fn load_all(path: &Path) -> Result<Vec<AppointmentRecord>, StorageError> {
    load_with_report(path).map(|report| report.records)
}

/// Load every record and report skipped rows.
///
/// A malformed `appointment_time` fails the whole load. Rows with the wrong
/// number of columns are skipped. A missing file loads as empty.
pub fn load_with_report(path: &Path) -> Result<LoadReport, StorageError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No records file, nothing to load");
            return Ok(LoadReport::default());
        }
        Err(e) => return Err(e.into()),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut report = LoadReport::default();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        if row.len() != RECORD_COLUMNS.len() {
            tracing::warn!(line, columns = row.len(), "Skipping malformed records row");
            report.skipped_lines.push(line);
            continue;
        }

        report.records.push(row_to_record(&row, line)?);
    }

    tracing::debug!(
        loaded = report.records.len(),
        skipped = report.skipped_lines.len(),
        "Records file loaded"
    );
    Ok(report)
}

/// Append one record, rewriting the full file.
///
/// The file must already exist (see [`initialize`]).
pub fn append(path: &Path, record: &AppointmentRecord) -> Result<(), StorageError> {
    let mut rows = read_raw_rows(path)?;
    if rows.is_empty() {
        rows.push(StringRecord::from(&RECORD_COLUMNS[..]));
    }
    rows.push(record_to_row(record));

    write_rows(path, &rows)?;

    tracing::debug!(path = %path.display(), rows = rows.len() - 1, "Appended appointment row");
    Ok(())
}

fn row_to_record(row: &StringRecord, line: u64) -> Result<AppointmentRecord, StorageError> {
    let raw_time = &row[2];
    let appointment_time =
        parse_record_time(raw_time).map_err(|_| StorageError::MalformedTimestamp {
            line,
            value: raw_time.to_string(),
        })?;

    Ok(AppointmentRecord {
        patient_name: row[0].to_string(),
        patient_contact: row[1].to_string(),
        appointment_time,
        address: row[3].to_string(),
        appointment_for: row[4].to_string(),
        status: row[5].to_string(),
    })
}

fn record_to_row(record: &AppointmentRecord) -> StringRecord {
    let time = format_record_time(&record.appointment_time);
    StringRecord::from(vec![
        record.patient_name.as_str(),
        record.patient_contact.as_str(),
        time.as_str(),
        record.address.as_str(),
        record.appointment_for.as_str(),
        record.status.as_str(),
    ])
}

/// Every row in the file, header included, exactly as stored.
fn read_raw_rows(path: &Path) -> Result<Vec<StringRecord>, StorageError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn write_rows(path: &Path, rows: &[StringRecord]) -> Result<(), StorageError> {
    let tmp = temp_path(path);

    let result = (|| -> Result<(), StorageError> {
        let mut writer = WriterBuilder::new().flexible(true).from_path(&tmp)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        drop(writer);
        std::fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_form_time;

    fn records_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("patient_records.csv")
    }

    fn make_record(name: &str, contact: &str, time: &str) -> AppointmentRecord {
        AppointmentRecord {
            patient_name: name.into(),
            patient_contact: contact.into(),
            appointment_time: parse_form_time(time).unwrap(),
            address: "1 Main St".into(),
            appointment_for: "Checkup".into(),
            status: "scheduled".into(),
        }
    }

    #[test]
    fn initialize_creates_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);

        assert!(initialize(&path).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "patient_name,patient_contact,appointment_time,address,appointment_for,status"
        );
        assert!(load_all(&path).unwrap().is_empty());
    }

    #[test]
    fn initialize_never_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        initialize(&path).unwrap();
        append(&path, &make_record("Jane Doe", "555-1234", "2024-01-01T09:00")).unwrap();
        let before = std::fs::read(&path).unwrap();

        assert!(!initialize(&path).unwrap());
        assert!(!initialize(&path).unwrap());

        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(load_all(&path).unwrap().len(), 1);
    }

    #[test]
    fn single_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        initialize(&path).unwrap();

        let jane = make_record("Jane Doe", "555-1234", "2024-01-01T09:00");
        append(&path, &jane).unwrap();

        let loaded = load_all(&path).unwrap();
        assert_eq!(loaded, vec![jane]);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Jane Doe,555-1234,2024-01-01 09:00,1 Main St,Checkup,scheduled"));
    }

    #[test]
    fn many_records_reload_in_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        initialize(&path).unwrap();

        let originals: Vec<_> = (0..12)
            .map(|i| {
                make_record(
                    &format!("Patient {i}"),
                    &format!("555-{i:04}"),
                    &format!("2024-02-{:02}T{:02}:15", 28 - i, 8 + i),
                )
            })
            .collect();
        for record in &originals {
            append(&path, record).unwrap();
        }

        assert_eq!(load_all(&path).unwrap(), originals);
    }

    #[test]
    fn fields_with_commas_and_quotes_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        initialize(&path).unwrap();

        let mut record = make_record("O'Brien, \"Pat\"", "555-0000", "2024-05-05T10:45");
        record.address = "Flat 2, 10 High St".into();
        record.appointment_for = "Follow-up, bloods".into();
        append(&path, &record).unwrap();

        assert_eq!(load_all(&path).unwrap(), vec![record]);
    }

    #[test]
    fn malformed_timestamp_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        std::fs::write(
            &path,
            "patient_name,patient_contact,appointment_time,address,appointment_for,status\n\
             Jane Doe,555-1234,2024-01-01 09:00,1 Main St,Checkup,scheduled\n\
             John Roe,555-9999,tomorrow at nine,2 Main St,Checkup,scheduled\n",
        )
        .unwrap();

        let err = load_all(&path).unwrap_err();
        match err {
            StorageError::MalformedTimestamp { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "tomorrow at nine");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_column_count_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        std::fs::write(
            &path,
            "patient_name,patient_contact,appointment_time,address,appointment_for,status\n\
             stray note\n\
             Jane Doe,555-1234,2024-01-01 09:00,1 Main St,Checkup,scheduled\n\
             a,b,c,d,e,f,g\n",
        )
        .unwrap();

        let report = load_with_report(&path).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].patient_name, "Jane Doe");
        assert_eq!(report.skipped_lines, vec![2, 4]);
    }

    #[test]
    fn append_preserves_stray_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        std::fs::write(
            &path,
            "patient_name,patient_contact,appointment_time,address,appointment_for,status\n\
             stray note\n",
        )
        .unwrap();

        append(&path, &make_record("Jane Doe", "555-1234", "2024-01-01T09:00")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("stray note"));
        let report = load_with_report(&path).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped_lines.len(), 1);
    }

    #[test]
    fn append_to_empty_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        std::fs::write(&path, "").unwrap();

        append(&path, &make_record("Jane Doe", "555-1234", "2024-01-01T09:00")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("patient_name,"));
        assert_eq!(load_all(&path).unwrap().len(), 1);
    }

    #[test]
    fn append_to_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);

        let err = append(&path, &make_record("Jane Doe", "555-1234", "2024-01-01T09:00"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn append_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = records_path(&dir);
        initialize(&path).unwrap();
        append(&path, &make_record("Jane Doe", "555-1234", "2024-01-01T09:00")).unwrap();

        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_all(&records_path(&dir)).unwrap().is_empty());
    }

    #[test]
    fn temp_path_is_sibling() {
        let path = Path::new("/data/patient_records.csv");
        assert_eq!(temp_path(path), PathBuf::from("/data/patient_records.csv.tmp"));
    }
}
