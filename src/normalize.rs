// Value Normalizer - balance cleaning, disposition canonicalization

use crate::columns::ResolvedColumns;
use crate::reader::RawTable;

/// The only disposition that participates in reporting. Exact match after
/// normalization; no partial matches, no synonyms.
pub const SELLABLE: &str = "SELLABLE";

/// Label applied to rows whose location cell is empty or absent.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// One ledger row after normalization. Rows are never dropped here; the
/// SELLABLE filter happens at aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub location: String,
    pub msku: String,
    pub disposition: String,
    pub balance: i64,
}

/// Clean a raw balance cell and coerce it to an integer quantity.
///
/// Every character that is not a digit, decimal point, or minus sign is
/// removed (thousands separators and unit suffixes included), the remainder
/// is parsed as a number, and the decimal part is truncated. Anything still
/// unparsable becomes 0 — the row stays in the dataset either way.
pub fn clean_balance(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) => value.trunc() as i64,
        Err(_) => 0,
    }
}

/// Trim and upper-case a disposition cell.
pub fn canonical_disposition(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn cell<'a>(row: &'a [String], idx: usize) -> &'a str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Normalize every row of a resolved table.
pub fn normalize_records(table: &RawTable, columns: &ResolvedColumns) -> Vec<NormalizedRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let location = cell(row, columns.location);
            NormalizedRecord {
                location: if location.is_empty() {
                    UNKNOWN_LOCATION.to_string()
                } else {
                    location.to_string()
                },
                msku: cell(row, columns.msku).to_string(),
                disposition: canonical_disposition(cell(row, columns.disposition)),
                balance: clean_balance(cell(row, columns.balance)),
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_balance_strips_noise() {
        assert_eq!(clean_balance("1,234.9 units"), 1234);
        assert_eq!(clean_balance("abc"), 0);
        assert_eq!(clean_balance("-56"), -56);
    }

    #[test]
    fn test_clean_balance_plain_values() {
        assert_eq!(clean_balance("42"), 42);
        assert_eq!(clean_balance("0"), 0);
        assert_eq!(clean_balance(""), 0);
        assert_eq!(clean_balance("  17 "), 17);
    }

    #[test]
    fn test_clean_balance_truncates_decimals() {
        assert_eq!(clean_balance("3.99"), 3);
        assert_eq!(clean_balance("-3.99"), -3);
    }

    #[test]
    fn test_clean_balance_garbage_is_zero() {
        assert_eq!(clean_balance("--5"), 0);
        assert_eq!(clean_balance("1.2.3"), 0);
        assert_eq!(clean_balance("N/A"), 0);
    }

    #[test]
    fn test_clean_balance_idempotent() {
        for input in ["1,234.9 units", "-56", "42", "abc"] {
            let once = clean_balance(input);
            assert_eq!(clean_balance(&once.to_string()), once);
        }
    }

    #[test]
    fn test_canonical_disposition() {
        assert_eq!(canonical_disposition(" sellable "), "SELLABLE");
        assert_eq!(canonical_disposition("Sellable"), "SELLABLE");
        assert_eq!(canonical_disposition("DAMAGED"), "DAMAGED");
    }

    #[test]
    fn test_canonical_disposition_idempotent() {
        let once = canonical_disposition(" Sellable ");
        assert_eq!(canonical_disposition(&once), once);
    }

    #[test]
    fn test_normalize_defaults_missing_location() {
        let table = RawTable {
            headers: vec![
                "MSKU".into(),
                "Disposition".into(),
                "Ending Warehouse Balance".into(),
                "Location".into(),
            ],
            rows: vec![
                vec!["SKU-1".into(), "sellable".into(), "1,000".into(), "".into()],
                // short row from lenient mode
                vec!["SKU-2".into()],
            ],
        };
        let columns = crate::columns::resolve_columns(&table).unwrap();
        let records = normalize_records(&table, &columns);

        assert_eq!(records[0].location, UNKNOWN_LOCATION);
        assert_eq!(records[0].disposition, SELLABLE);
        assert_eq!(records[0].balance, 1000);

        assert_eq!(records[1].location, UNKNOWN_LOCATION);
        assert_eq!(records[1].disposition, "");
        assert_eq!(records[1].balance, 0);
    }
}
