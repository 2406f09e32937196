// Warehouse Stock Reporting - Core Library
// Exposes the ingestion pipeline for the CLI, web server, and tests

pub mod aggregate;
pub mod columns;
pub mod error;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod reader;
pub mod report;

// Re-export commonly used types
pub use aggregate::{AggregateRow, LocationTotal, StockAggregate, StockSummary};
pub use columns::{find_column, resolve_columns, Field, ResolvedColumns, REQUIRED_FIELDS};
pub use error::{ReportError, Result};
pub use normalize::{
    canonical_disposition, clean_balance, normalize_records, NormalizedRecord, SELLABLE,
    UNKNOWN_LOCATION,
};
pub use pdf::render_pdf;
pub use pipeline::ingest;
pub use reader::{read_table, RawTable};
pub use report::{
    location_csv_filename, pdf_filename, report_timestamp, rows_to_csv, AGGREGATE_CSV_FILENAME,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
