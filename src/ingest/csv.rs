use ::csv::{ReaderBuilder, StringRecord, Trim};

use super::{IngestionError, RawRow};

/// Parse failures past this many are counted but not itemized.
const MAX_ERROR_DETAILS: usize = 50;

/// Parse an uploaded CSV into raw rows keyed by the header line.
///
/// Blank lines are skipped. Any malformed row fails the whole file so that
/// nothing is inserted from a partially readable upload.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, IngestionError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestionError::NoFile);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::None)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestionError::ParseFailure { details: vec![e.to_string()] })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut details = Vec::new();
    let mut failures = 0usize;
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let row: RawRow = headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect();
                rows.push(row);
            }
            Err(e) => {
                failures += 1;
                if details.len() < MAX_ERROR_DETAILS {
                    details.push(e.to_string());
                }
                // An I/O-level error leaves the reader unusable
                if !matches!(e.kind(), ::csv::ErrorKind::UnequalLengths { .. } | ::csv::ErrorKind::Utf8 { .. }) {
                    break;
                }
            }
        }
    }

    if failures > 0 {
        if failures > details.len() {
            details.push(format!("... and {} more", failures - details.len()));
        }
        return Err(IngestionError::ParseFailure { details });
    }

    Ok(rows)
}
