// Tabular Reader - decodes raw ledger bytes into a structured table

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

use crate::error::{ReportError, Result};

/// A decoded ledger table: one header row plus data rows, all untyped text.
///
/// Nothing is interpreted at this stage. Rows produced by the lenient parse
/// mode are padded/truncated to the header width, so consumers can index
/// cells by resolved column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Decode and parse raw ledger bytes.
///
/// Decoding strategies are tried in priority order against the full input:
///
/// 1. strict UTF-8
/// 2. WINDOWS-1252 (covers latin1-style exports)
/// 3. lossy UTF-8
///
/// Each decoded text goes through a strict CSV parse; the first attempt that
/// parses without error wins. If all three fail, a single lenient pass
/// (lossy UTF-8, ragged rows tolerated, unparsable records skipped) decides
/// the outcome. Every attempt starts from the original byte slice.
pub fn read_table(bytes: &[u8]) -> Result<RawTable> {
    let attempts: [Option<Cow<str>>; 3] = [
        std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        Some(WINDOWS_1252.decode(bytes).0),
        Some(String::from_utf8_lossy(bytes)),
    ];

    for text in attempts.into_iter().flatten() {
        if let Ok(table) = parse_strict(&text) {
            return Ok(table);
        }
    }

    parse_lenient(&String::from_utf8_lossy(bytes)).map_err(ReportError::Read)
}

/// Strict parse: every record must match the header width.
fn parse_strict(text: &str) -> std::result::Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Lenient parse: skips records the CSV reader cannot recover, pads short
/// rows and truncates long ones to the header width.
fn parse_lenient(text: &str) -> std::result::Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(_) => continue,
        };
        let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ============================================================================
// TESTS
// ============================================================================
