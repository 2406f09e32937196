// Ingestion Pipeline - read → resolve → normalize → aggregate

use crate::aggregate::StockAggregate;
use crate::columns::resolve_columns;
use crate::error::Result;
use crate::normalize::normalize_records;
use crate::reader::read_table;

/// Run the full ingestion pipeline over raw ledger bytes.
///
/// Pure: same bytes in, same aggregate out, no ambient state. Halting
/// conditions are the reader's parse failure, unresolved columns, and an
/// empty result after the SELLABLE filter — everything else flows through.
pub fn ingest(bytes: &[u8]) -> Result<StockAggregate> {
    let table = read_table(bytes)?;
    let columns = resolve_columns(&table)?;
    let records = normalize_records(&table, &columns);
    StockAggregate::from_records(&records)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::normalize::SELLABLE;

    const LEDGER: &[u8] = b"\
Date,MSKU,Disposition,Ending Warehouse Balance,Location
2025-02-27,ABC-1,SELLABLE,3,Delhi
2025-02-27,ABC-1,Sellable,2,Delhi
2025-02-27,XYZ-2,SELLABLE,\"1,200\",Mumbai
2025-02-27,ABC-3,sellable ,7,
2025-02-27,DMG-1,DAMAGED,99,Delhi
2025-02-27,BAD-1,SELLABLE,abc,Mumbai
";

    #[test]
    fn test_end_to_end_aggregation() {
        let agg = ingest(LEDGER).unwrap();
        let summary = agg.summary();

        // Delhi/ABC-1 merged across casings, Unknown from the empty cell,
        // BAD-1's unparseable balance kept as 0
        assert_eq!(summary.warehouses, 3);
        assert_eq!(summary.unique_mskus, 4);
        assert_eq!(summary.total_sellable, 3 + 2 + 1200 + 7);

        let keys: Vec<(&str, &str, i64)> = agg
            .rows()
            .iter()
            .map(|r| (r.location.as_str(), r.msku.as_str(), r.balance))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Delhi", "ABC-1", 5),
                ("Mumbai", "BAD-1", 0),
                ("Mumbai", "XYZ-2", 1200),
                ("Unknown", "ABC-3", 7),
            ]
        );
    }

    #[test]
    fn test_sum_invariant_through_pipeline() {
        let table = read_table(LEDGER).unwrap();
        let columns = resolve_columns(&table).unwrap();
        let records = normalize_records(&table, &columns);
        let sellable_sum: i64 = records
            .iter()
            .filter(|r| r.disposition == SELLABLE)
            .map(|r| r.balance)
            .sum();

        let agg = ingest(LEDGER).unwrap();
        let total: i64 = agg.rows().iter().map(|r| r.balance).sum();

        assert_eq!(total, sellable_sum);
    }

    #[test]
    fn test_latin1_ledger() {
        let bytes = b"MSKU,Disposition,Ending Warehouse Balance,Location\nSKU-1,SELLABLE,5,Z\xfcrich\n";
        let agg = ingest(bytes).unwrap();

        assert_eq!(agg.rows()[0].location, "Zürich");
    }

    #[test]
    fn test_aliased_headers_with_noise() {
        let bytes = b" msku ,DISPOSITION,balance,LOCATION\nSKU-1,sellable,10,Delhi\n";
        let agg = ingest(bytes).unwrap();

        assert_eq!(agg.summary().total_sellable, 10);
    }

    #[test]
    fn test_missing_column_halts() {
        let bytes = b"SKU,Disposition,Balance\nSKU-1,SELLABLE,10\n";
        let err = ingest(bytes).unwrap_err();

        assert!(matches!(err, ReportError::Schema { .. }));
    }

    #[test]
    fn test_all_damaged_halts_with_warning() {
        let bytes = b"MSKU,Disposition,Ending Warehouse Balance,Location\n\
SKU-1,DAMAGED,10,Delhi\nSKU-2,DAMAGED,3,Mumbai\n";
        let err = ingest(bytes).unwrap_err();

        assert!(matches!(err, ReportError::NoSellableRows));
        assert_eq!(err.to_string(), "No SELLABLE items found.");
    }

    #[test]
    fn test_ragged_rows_survive_via_lenient_mode() {
        let bytes = b"MSKU,Disposition,Ending Warehouse Balance,Location\n\
SKU-1,SELLABLE,10,Delhi\nSKU-2,SELLABLE,5,Mumbai,stray-cell\n";
        let agg = ingest(bytes).unwrap();

        assert_eq!(agg.summary().total_sellable, 15);
    }
}
