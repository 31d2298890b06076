//! CSV Export
//!
//! Writes log records as `;`-separated rows.

use std::path::Path;

use crate::core::OpsError;
use crate::domain::search::{shift_timestamp, LogRecord};

pub const HEADER: [&str; 4] = ["Timestamp", "Hostname", "Log level", "Message"];

/// Write records to `path`, shifting each timestamp by `offset_hours`.
pub fn write_records(
    path: &Path,
    records: &[LogRecord],
    offset_hours: i64,
) -> Result<usize, OpsError> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;

    wtr.write_record(HEADER)?;

    for record in records {
        wtr.write_record([
            shift_timestamp(&record.timestamp, offset_hours).as_str(),
            record.hostname.as_str(),
            record.level.as_str(),
            record.message.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, message: &str) -> LogRecord {
        LogRecord {
            timestamp: timestamp.to_string(),
            hostname: "SRVPN-LBBDD-01".to_string(),
            level: "Warning".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_writes_header_and_shifted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");

        let written = write_records(
            &path,
            &[
                record("2021-10-04T21:15:02.123Z", "Aborted connection"),
                record("not-a-date", "kept as-is"),
            ],
            2,
        )
        .unwrap();

        assert_eq!(written, 2);
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Timestamp;Hostname;Log level;Message");
        assert_eq!(
            lines[1],
            "2021-10-04T23:15:02.123000Z;SRVPN-LBBDD-01;Warning;Aborted connection"
        );
        assert_eq!(lines[2], "not-a-date;SRVPN-LBBDD-01;Warning;kept as-is");
    }

    #[test]
    fn test_message_with_delimiter_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");

        write_records(&path, &[record("", "a;b")], 0).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().ends_with(";\"a;b\""));
    }

    #[test]
    fn test_empty_result_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        assert_eq!(write_records(&path, &[], 2).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Timestamp;Hostname;Log level;Message\n"
        );
    }
}
