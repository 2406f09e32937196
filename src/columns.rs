// Column Resolver - maps loosely-named headers to semantic fields

use crate::error::{ReportError, Result};
use crate::reader::RawTable;

/// The four semantic fields the report needs from a ledger export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Msku,
    Disposition,
    Balance,
    Location,
}

pub const REQUIRED_FIELDS: [Field; 4] = [
    Field::Msku,
    Field::Disposition,
    Field::Balance,
    Field::Location,
];

impl Field {
    /// Canonical display name, as it appears in a well-formed export.
    pub fn display_name(&self) -> &'static str {
        match self {
            Field::Msku => "MSKU",
            Field::Disposition => "Disposition",
            Field::Balance => "Ending Warehouse Balance",
            Field::Location => "Location",
        }
    }

    /// Short alias accepted as a fallback header name.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Msku => "msku",
            Field::Disposition => "disposition",
            Field::Balance => "balance",
            Field::Location => "location",
        }
    }
}

/// Header indexes for the four required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub msku: usize,
    pub disposition: usize,
    pub balance: usize,
    pub location: usize,
}

fn fold(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Index of the header matching `name`, ignoring case and surrounding
/// whitespace. The first occurrence wins when duplicates exist.
pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    let wanted = fold(name);
    headers.iter().position(|h| fold(h) == wanted)
}

fn resolve_field(headers: &[String], field: Field) -> Option<usize> {
    find_column(headers, field.display_name()).or_else(|| find_column(headers, field.key()))
}

/// Resolve all four required fields against the table's headers.
///
/// Fails with a schema error listing every missing field by display name
/// together with the headers actually present. Non-retryable: the operator
/// has to fix the export.
pub fn resolve_columns(table: &RawTable) -> Result<ResolvedColumns> {
    let mut indexes = [0usize; REQUIRED_FIELDS.len()];
    let mut missing = Vec::new();

    for (slot, field) in REQUIRED_FIELDS.iter().enumerate() {
        match resolve_field(&table.headers, *field) {
            Some(idx) => indexes[slot] = idx,
            None => missing.push(field.display_name().to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ReportError::Schema {
            missing,
            found: table.headers.clone(),
        });
    }

    Ok(ResolvedColumns {
        msku: indexes[0],
        disposition: indexes[1],
        balance: indexes[2],
        location: indexes[3],
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn test_find_column_case_insensitive() {
        let headers = vec!["Msku".to_string(), "Location".to_string()];
        assert_eq!(find_column(&headers, "MSKU"), Some(0));
        assert_eq!(find_column(&headers, "msku"), Some(0));
        assert_eq!(find_column(&headers, "location"), Some(1));
    }

    #[test]
    fn test_find_column_whitespace_insensitive() {
        let headers = vec![" msku ".to_string()];
        assert_eq!(find_column(&headers, "MSKU"), Some(0));
        assert_eq!(find_column(&headers, " Msku"), Some(0));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let headers = vec!["MSKU".to_string(), "msku ".to_string()];
        assert_eq!(find_column(&headers, "msku"), Some(0));
    }

    #[test]
    fn test_resolve_display_names() {
        let t = table(&["MSKU", "Disposition", "Ending Warehouse Balance", "Location"]);
        let cols = resolve_columns(&t).unwrap();

        assert_eq!(cols.msku, 0);
        assert_eq!(cols.disposition, 1);
        assert_eq!(cols.balance, 2);
        assert_eq!(cols.location, 3);
    }

    #[test]
    fn test_resolve_short_aliases_any_order() {
        let t = table(&["location", "balance", "msku", "disposition"]);
        let cols = resolve_columns(&t).unwrap();

        assert_eq!(cols.location, 0);
        assert_eq!(cols.balance, 1);
        assert_eq!(cols.msku, 2);
        assert_eq!(cols.disposition, 3);
    }

    #[test]
    fn test_display_name_preferred_over_alias() {
        let t = table(&["balance", "Ending Warehouse Balance", "msku", "disposition", "location"]);
        let cols = resolve_columns(&t).unwrap();

        assert_eq!(cols.balance, 1);
    }

    #[test]
    fn test_missing_location_column() {
        // "SKU" resolves to neither "MSKU" nor "msku", so it is missing too
        let t = table(&["SKU", "Disposition", "Balance"]);
        let err = resolve_columns(&t).unwrap_err();

        match err {
            ReportError::Schema { missing, found } => {
                assert!(missing.contains(&"Location".to_string()));
                assert!(missing.contains(&"MSKU".to_string()));
                assert_eq!(found, vec!["SKU", "Disposition", "Balance"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_error_message_lists_headers() {
        let t = table(&["SKU", "Disposition", "Balance"]);
        let message = resolve_columns(&t).unwrap_err().to_string();

        assert!(message.contains("Location"));
        assert!(message.contains("SKU"));
        assert!(message.contains("Disposition"));
    }
}
