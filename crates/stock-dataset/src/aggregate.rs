//! Aggregations over a dataset
//!
//! Three summaries are supported: row count, profit sum and a contingency
//! table (grouping key × status, cells are pair counts).

use crate::record::{Field, FieldValue, StockRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Row key of a contingency table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One row per model
    Model,
    /// One row per size
    Size,
}

impl GroupBy {
    /// Field the rows are keyed by
    #[must_use]
    pub fn field(self) -> Field {
        match self {
            Self::Model => Field::Model,
            Self::Size => Field::Size,
        }
    }
}

/// Which summary to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    /// Number of rows
    Count,
    /// Sum of profit
    SumProfit,
    /// Contingency table keyed by model or size
    TableBy(GroupBy),
}

/// Computed summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregate {
    /// Row count
    Count(usize),
    /// Whole-peso profit sum
    SumProfit(i64),
    /// Grouping key × status counts
    Table(ContingencyTable),
}

/// One row of a contingency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Group key (model name or size)
    pub key: FieldValue,
    /// Counts aligned with [`ContingencyTable::columns`]
    pub counts: Vec<usize>,
}

impl TableRow {
    /// Pairs in this group across all statuses
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Grouping key × status table of pair counts
///
/// Columns are the statuses present in the input, sorted by label. Rows are
/// sorted by key; missing combinations are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    group_by: GroupBy,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ContingencyTable {
    /// Grouping used for rows
    #[inline]
    #[must_use]
    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    /// Status labels, one per column
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in key order
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Count for a key and status label, zero if absent
    #[must_use]
    pub fn cell(&self, key: &FieldValue, status: &str) -> usize {
        let Some(col) = self.columns.iter().position(|c| c == status) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|r| &r.key == key)
            .map_or(0, |r| r.counts[col])
    }

    /// Sum of all cells
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().map(TableRow::total).sum()
    }

    /// True if there are no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sum profit with nulls as zero, truncating the fractional part
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn sum_profit(records: &[StockRecord]) -> i64 {
    let total: f64 = records.iter().map(StockRecord::profit_or_zero).sum();
    total.trunc() as i64
}

/// Build a contingency table keyed by `group_by`
pub(crate) fn contingency(records: &[StockRecord], group_by: GroupBy) -> ContingencyTable {
    let field = group_by.field();
    let columns: Vec<String> = records
        .iter()
        .map(|r| r.status.label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut grouped: BTreeMap<FieldValue, Vec<usize>> = BTreeMap::new();
    for record in records {
        // Model and size are always present on a record
        let Some(key) = record.get(field) else {
            continue;
        };
        let Some(col) = columns.iter().position(|c| c == record.status.label()) else {
            continue;
        };
        grouped.entry(key).or_insert_with(|| vec![0; columns.len()])[col] += 1;
    }

    ContingencyTable {
        group_by,
        columns,
        rows: grouped
            .into_iter()
            .map(|(key, counts)| TableRow { key, counts })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;

    fn records() -> Vec<StockRecord> {
        vec![
            StockRecord::new("Roja", 42, Status::InStock),
            StockRecord::new("Air Max Negra", 40, Status::Sold).with_profit(-500.75),
            StockRecord::new("Air Max Negra", 9, Status::InStock),
            StockRecord::new("Roja", 42, Status::Sold).with_profit(20_000.5),
        ]
    }

    #[test]
    fn sum_truncates_fraction() {
        assert_eq!(sum_profit(&records()), 19_499);
    }

    #[test]
    fn sum_over_nothing_is_zero() {
        assert_eq!(sum_profit(&[]), 0);
    }

    #[test]
    fn table_by_model() {
        let table = contingency(&records(), GroupBy::Model);
        assert_eq!(table.columns(), &["En stock".to_string(), "Vendido".to_string()]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].key, FieldValue::text("Air Max Negra"));
        assert_eq!(table.cell(&FieldValue::text("Roja"), "Vendido"), 1);
        assert_eq!(table.cell(&FieldValue::text("Roja"), "Reservado"), 0);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn table_by_size_orders_numerically() {
        let table = contingency(&records(), GroupBy::Size);
        let keys: Vec<_> = table.rows().iter().map(|r| r.key.clone()).collect();
        assert_eq!(
            keys,
            vec![FieldValue::Int(9), FieldValue::Int(40), FieldValue::Int(42)]
        );
        assert_eq!(table.rows()[2].counts, vec![1, 1]);
    }

    #[test]
    fn table_only_has_present_statuses() {
        let only_stock = vec![StockRecord::new("Roja", 42, Status::InStock)];
        let table = contingency(&only_stock, GroupBy::Model);
        assert_eq!(table.columns(), &["En stock".to_string()]);
    }

    #[test]
    fn empty_table() {
        let table = contingency(&[], GroupBy::Size);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }
}
