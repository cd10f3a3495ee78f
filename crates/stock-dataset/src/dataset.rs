//! Dataset snapshot and filter primitives
//!
//! A [`Dataset`] is an immutable, ordered list of records. Filtering takes a
//! [`PredicateSet`] (logical AND of field constraints) and returns a new
//! dataset; nothing is mutated in place.

use crate::aggregate::{self, Aggregate, AggregateKind};
use crate::record::{Field, FieldValue, Status, StockRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single field constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Field equals value
    Eq(Field, FieldValue),
    /// Field equals any of the values
    In(Field, Vec<FieldValue>),
}

impl Predicate {
    /// Equality constraint
    #[inline]
    pub fn equals(field: Field, value: impl Into<FieldValue>) -> Self {
        Self::Eq(field, value.into())
    }

    /// Field this predicate constrains
    #[must_use]
    pub fn field(&self) -> Field {
        match self {
            Self::Eq(field, _) | Self::In(field, _) => *field,
        }
    }

    /// Evaluate against a record
    ///
    /// A record without a value for the field never matches.
    #[must_use]
    pub fn matches(&self, record: &StockRecord) -> bool {
        let Some(actual) = record.get(self.field()) else {
            return false;
        };
        match self {
            Self::Eq(_, expected) => actual == *expected,
            Self::In(_, expected) => expected.contains(&actual),
        }
    }
}

/// Conjunction of predicates
///
/// An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Empty set (matches everything)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a predicate in place
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Predicates in insertion order
    #[inline]
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Number of predicates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True if no constraint is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True if every predicate matches
    #[must_use]
    pub fn matches(&self, record: &StockRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

/// Dashboard headline numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventorySummary {
    /// Total pairs in the sheet
    pub total_pairs: usize,
    /// Pairs still in stock
    pub in_stock: usize,
    /// Pairs sold
    pub sold: usize,
    /// Sum of profit over the whole sheet, truncated to whole pesos
    pub net_profit: i64,
}

/// Selections made in the quick-filter panel
///
/// Each unset selection means "(todos)". Sizes are a multi-select, so they
/// become a membership constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickFilter {
    /// Selected model
    pub model: Option<String>,
    /// Selected sizes
    pub sizes: Vec<i64>,
    /// Selected status label
    pub status: Option<String>,
    /// Selected seller
    pub seller: Option<String>,
}

impl QuickFilter {
    /// Convert selections into predicates
    #[must_use]
    pub fn to_predicates(&self) -> PredicateSet {
        let mut set = PredicateSet::new();
        if let Some(model) = &self.model {
            set.push(Predicate::equals(Field::Model, model.as_str()));
        }
        if !self.sizes.is_empty() {
            set.push(Predicate::In(
                Field::Size,
                self.sizes.iter().copied().map(FieldValue::Int).collect(),
            ));
        }
        if let Some(status) = &self.status {
            set.push(Predicate::equals(Field::Status, status.as_str()));
        }
        if let Some(seller) = &self.seller {
            set.push(Predicate::equals(Field::Seller, seller.as_str()));
        }
        set
    }
}

/// Immutable, ordered snapshot of the stock sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<StockRecord>,
}

impl Dataset {
    /// Wrap records
    #[inline]
    #[must_use]
    pub fn new(records: Vec<StockRecord>) -> Self {
        Self { records }
    }

    /// Records in sheet order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    /// Row count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the sheet has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subset matching all predicates, order preserved
    #[must_use]
    pub fn filter(&self, predicates: &PredicateSet) -> Dataset {
        if predicates.is_empty() {
            return self.clone();
        }
        Dataset::new(
            self.records
                .iter()
                .filter(|r| predicates.matches(r))
                .cloned()
                .collect(),
        )
    }

    /// Compute an aggregate over all rows
    #[must_use]
    pub fn aggregate(&self, kind: AggregateKind) -> Aggregate {
        match kind {
            AggregateKind::Count => Aggregate::Count(self.len()),
            AggregateKind::SumProfit => Aggregate::SumProfit(aggregate::sum_profit(&self.records)),
            AggregateKind::TableBy(group_by) => {
                Aggregate::Table(aggregate::contingency(&self.records, group_by))
            }
        }
    }

    /// Sum of profit, null as zero, truncated toward zero
    #[inline]
    #[must_use]
    pub fn profit_sum(&self) -> i64 {
        aggregate::sum_profit(&self.records)
    }

    /// Count rows with the given status
    #[must_use]
    pub fn count_status(&self, status: Status) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Headline numbers for the dashboard
    #[must_use]
    pub fn summary(&self) -> InventorySummary {
        InventorySummary {
            total_pairs: self.len(),
            in_stock: self.count_status(Status::InStock),
            sold: self.count_status(Status::Sold),
            net_profit: self.profit_sum(),
        }
    }

    /// Distinct values present for a field, sorted
    ///
    /// Rows without a value (missing seller) are skipped.
    #[must_use]
    pub fn distinct(&self, field: Field) -> Vec<FieldValue> {
        self.records
            .iter()
            .filter_map(|r| r.get(field))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<StockRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = StockRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            StockRecord::new("Air Max Blanca", 41, Status::InStock),
            StockRecord::new("Air Max Blanca", 41, Status::Sold)
                .with_seller("Tefi")
                .with_profit(15_000.0),
            StockRecord::new("Air Max Negra", 40, Status::Sold)
                .with_seller("Enzo")
                .with_profit(9_999.9),
            StockRecord::new("Roja", 38, Status::InStock),
        ])
    }

    #[test]
    fn empty_predicates_keep_everything() {
        let ds = sample();
        assert_eq!(ds.filter(&PredicateSet::new()).len(), 4);
    }

    #[test]
    fn predicates_are_anded() {
        let ds = sample();
        let set = PredicateSet::new()
            .with(Predicate::equals(Field::Model, "Air Max Blanca"))
            .with(Predicate::equals(Field::Status, "Vendido"));
        let out = ds.filter(&set);
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].seller.as_deref(), Some("Tefi"));
    }

    #[test]
    fn membership_predicate() {
        let ds = sample();
        let set = PredicateSet::new().with(Predicate::In(
            Field::Size,
            vec![FieldValue::Int(38), FieldValue::Int(40)],
        ));
        assert_eq!(ds.filter(&set).len(), 2);
    }

    #[test]
    fn missing_seller_never_matches() {
        let ds = sample();
        let set = PredicateSet::new().with(Predicate::equals(Field::Seller, "Laura"));
        assert!(ds.filter(&set).is_empty());
    }

    #[test]
    fn unknown_value_yields_zero_matches() {
        let ds = sample();
        let set = PredicateSet::new().with(Predicate::equals(Field::Status, "sold"));
        assert_eq!(ds.filter(&set).len(), 0);
    }

    #[test]
    fn summary_numbers() {
        let summary = sample().summary();
        assert_eq!(summary.total_pairs, 4);
        assert_eq!(summary.in_stock, 2);
        assert_eq!(summary.sold, 2);
        assert_eq!(summary.net_profit, 24_999);
    }

    #[test]
    fn distinct_sellers_skip_missing() {
        let sellers = sample().distinct(Field::Seller);
        assert_eq!(sellers, vec![FieldValue::text("Enzo"), FieldValue::text("Tefi")]);
    }

    #[test]
    fn quick_filter_builds_membership() {
        let filter = QuickFilter {
            model: Some("Air Max Blanca".into()),
            sizes: vec![41, 42],
            status: None,
            seller: None,
        };
        let set = filter.to_predicates();
        assert_eq!(set.len(), 2);
        assert_eq!(sample().filter(&set).len(), 2);
    }
}
