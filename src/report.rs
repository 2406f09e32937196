// Report Renderer - CSV artifacts and download filenames

use chrono::{DateTime, Local};

use crate::aggregate::AggregateRow;
use crate::error::{ReportError, Result};

/// Fixed filename for the full aggregate export.
pub const AGGREGATE_CSV_FILENAME: &str = "aggregated_sellable_by_location_msku.csv";

const CSV_HEADERS: [&str; 3] = ["Location", "MSKU", "Ending Warehouse Balance"];

/// Serialize rows to UTF-8 CSV bytes: header row present, no index column.
///
/// Works for any table-shaped subset — the full aggregate or a single
/// location's rows. The header row is written even when `rows` is empty.
pub fn rows_to_csv(rows: &[AggregateRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}

/// Download filename for one location's rows:
/// `<location with spaces replaced by underscores>_sellable.csv`.
pub fn location_csv_filename(location: &str) -> String {
    format!("{}_sellable.csv", location.replace(' ', "_"))
}

/// Download filename for the PDF report:
/// `warehouse_stock_report_<YYYYMMDD_HHMMSS>.pdf`.
pub fn pdf_filename(now: DateTime<Local>) -> String {
    format!("warehouse_stock_report_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

/// Human-readable stamp for the PDF's "Generated on:" line.
pub fn report_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// TESTS
// ============================================================================
