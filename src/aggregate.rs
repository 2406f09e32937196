// Aggregator - SELLABLE filter, (location, MSKU) grouping, summary stats

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::normalize::{NormalizedRecord, SELLABLE};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One (location, MSKU) group with its summed sellable balance.
///
/// The serde renames double as the CSV header row, so exports carry the
/// canonical column names regardless of what the input called them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "MSKU")]
    pub msku: String,
    #[serde(rename = "Ending Warehouse Balance")]
    pub balance: i64,
}

/// Per-location rollup used for metrics and card ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationTotal {
    pub location: String,
    pub total: i64,
}

/// Headline metrics for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub warehouses: usize,
    pub unique_mskus: usize,
    pub total_sellable: i64,
}

/// Aggregated sellable stock.
///
/// Rows are kept in grouping order — ascending (location, MSKU) — which is
/// the deterministic order the PDF sections follow. Derived views (location
/// totals, card subsets, substring filter) never mutate the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAggregate {
    rows: Vec<AggregateRow>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

impl StockAggregate {
    /// Filter to SELLABLE records and group by (location, MSKU).
    ///
    /// Returns `NoSellableRows` when nothing survives the filter; callers
    /// surface that as a notice and skip report generation.
    pub fn from_records(records: &[NormalizedRecord]) -> Result<Self> {
        let mut groups: BTreeMap<(String, String), i64> = BTreeMap::new();

        for record in records.iter().filter(|r| r.disposition == SELLABLE) {
            *groups
                .entry((record.location.clone(), record.msku.clone()))
                .or_insert(0) += record.balance;
        }

        if groups.is_empty() {
            return Err(ReportError::NoSellableRows);
        }

        let rows = groups
            .into_iter()
            .map(|((location, msku), balance)| AggregateRow {
                location,
                msku,
                balance,
            })
            .collect();

        Ok(StockAggregate { rows })
    }

    /// Rows in grouping order.
    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> StockSummary {
        let mskus: HashSet<&str> = self.rows.iter().map(|r| r.msku.as_str()).collect();
        StockSummary {
            warehouses: self.location_totals().len(),
            unique_mskus: mskus.len(),
            total_sellable: self.rows.iter().map(|r| r.balance).sum(),
        }
    }

    /// Locations with their sellable totals, largest total first. The sort
    /// is stable over grouping order, so ties stay alphabetical.
    pub fn location_totals(&self) -> Vec<LocationTotal> {
        let mut totals: Vec<LocationTotal> = Vec::new();

        // Rows are sorted by location, so each location is contiguous
        for row in &self.rows {
            let same_location =
                matches!(totals.last(), Some(last) if last.location == row.location);
            if same_location {
                if let Some(last) = totals.last_mut() {
                    last.total += row.balance;
                }
            } else {
                totals.push(LocationTotal {
                    location: row.location.clone(),
                    total: row.balance,
                });
            }
        }

        totals.sort_by(|a, b| b.total.cmp(&a.total));
        totals
    }

    /// One location's rows, largest balance first — the ordering used by
    /// the dashboard cards and the per-location CSV export.
    pub fn location_rows(&self, location: &str) -> Vec<AggregateRow> {
        let mut rows: Vec<AggregateRow> = self
            .rows
            .iter()
            .filter(|r| r.location == location)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.balance.cmp(&a.balance));
        rows
    }

    /// Fresh aggregate retaining only rows whose MSKU contains `needle`,
    /// case-insensitive. Totals and ordering of the result are recomputed
    /// from the retained rows alone; `self` is untouched. An empty needle
    /// returns a full copy.
    pub fn filter_msku(&self, needle: &str) -> StockAggregate {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .filter(|r| r.msku.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        StockAggregate { rows }
    }
}

// ============================================================================
// TESTS
// ============================================================================
