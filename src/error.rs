use thiserror::Error;

/// Errors surfaced by the ingestion/reporting pipeline.
///
/// `NoSellableRows` is a halting condition but not a failure: the
/// presentation layer renders it as a notice instead of an error box.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Every decode/parse strategy failed, including the lenient pass.
    #[error("could not read the uploaded file: {0}")]
    Read(csv::Error),

    /// One or more required semantic columns could not be resolved.
    #[error(
        "CSV is missing required columns: {}. \
         Required: MSKU, Disposition, Ending Warehouse Balance, Location. \
         Found: [{}]",
        missing.join(", "),
        found.join(", ")
    )]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// No row survived the SELLABLE filter.
    #[error("No SELLABLE items found.")]
    NoSellableRows,

    /// CSV serialization failed while rendering an export.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// PDF assembly failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
