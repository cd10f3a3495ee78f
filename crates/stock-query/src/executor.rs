//! Query execution
//!
//! Applies a [`FilterSpec`] to a dataset and renders the requested summary
//! in the business locale: pesos with a dot as thousands separator.

use crate::filter_spec::{AggregationKind, FilterSpec};
use serde::Serialize;
use stock_dataset::{Aggregate, ContingencyTable, Dataset};

/// What the user sees for one question
///
/// `table` carries the contingency table for table aggregations; `message`
/// is always the primary answer line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisplayResult {
    /// Answer line
    pub message: String,
    /// Side table, when one was requested
    pub table: Option<ContingencyTable>,
}

impl DisplayResult {
    /// Message-only result
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            table: None,
        }
    }

    /// No answer (empty question)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if there is nothing to show
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.table.is_none()
    }
}

/// Count and profit over one filtered subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    /// Matching pairs
    pub matches: usize,
    /// Profit over matching pairs
    pub profit: i64,
}

impl MatchSummary {
    /// Answer line of the rule-based mode
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Coincidencias: {} par(es). Ganancia acumulada: {}.",
            self.matches,
            format_currency(self.profit)
        )
    }
}

/// Stateless executor over an explicit dataset handle
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    /// Create executor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Rows matching the spec's constraints
    #[must_use]
    pub fn select(&self, dataset: &Dataset, spec: &FilterSpec) -> Dataset {
        dataset.filter(&spec.to_predicates())
    }

    /// Apply constraints and compute the requested aggregation
    #[must_use]
    pub fn execute(&self, dataset: &Dataset, spec: &FilterSpec) -> DisplayResult {
        let subset = self.select(dataset, spec);
        tracing::debug!(matches = subset.len(), aggregation = spec.aggregation.name(), "executing");

        match subset.aggregate(spec.aggregation.aggregate_kind()) {
            Aggregate::Count(n) if spec.aggregation == AggregationKind::Matches => {
                DisplayResult::text(format!("Coincidencias: {n} par(es)."))
            }
            Aggregate::Count(n) => DisplayResult::text(format!("Resultado: {n} par(es).")),
            Aggregate::SumProfit(total) => {
                DisplayResult::text(format!("Ganancia acumulada: {}", format_currency(total)))
            }
            Aggregate::Table(table) => {
                let message = match spec.aggregation {
                    AggregationKind::TableBySize => "Tabla por talle mostrada arriba.",
                    _ => "Tabla por modelo mostrada arriba.",
                };
                DisplayResult {
                    message: message.to_string(),
                    table: Some(table),
                }
            }
        }
    }

    /// Count and profit over the same subset, ignoring the aggregation kind
    #[must_use]
    pub fn summarize(&self, dataset: &Dataset, spec: &FilterSpec) -> MatchSummary {
        let subset = self.select(dataset, spec);
        MatchSummary {
            matches: subset.len(),
            profit: subset.profit_sum(),
        }
    }
}

/// Group digits in threes with a dot: `1234567` → `1.234.567`
#[must_use]
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Peso amount: `$ 1.234.567`
#[must_use]
pub fn format_currency(value: i64) -> String {
    format!("$ {}", format_thousands(value))
}
