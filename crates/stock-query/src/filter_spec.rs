//! Intermediate query representation
//!
//! A [`FilterSpec`] is built fresh for every question by one of the
//! interpreters and consumed immediately by the executor.

use serde::{Deserialize, Serialize};
use stock_dataset::{AggregateKind, Field, GroupBy, Predicate, PredicateSet};

/// Requested summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// Number of matching pairs
    #[default]
    Count,
    /// Profit over matching pairs
    SumProfit,
    /// Model × status table
    TableByModel,
    /// Size × status table
    TableBySize,
    /// Plain match count for a reply naming an aggregation outside the vocabulary
    Matches,
}

impl AggregationKind {
    /// Every kind offered to the completion service, in prompt order
    pub const ALL: [AggregationKind; 4] = [
        Self::Count,
        Self::SumProfit,
        Self::TableByModel,
        Self::TableBySize,
    ];

    /// Wire name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::SumProfit => "sum_profit",
            Self::TableByModel => "table_by_model",
            Self::TableBySize => "table_by_size",
            Self::Matches => "matches",
        }
    }

    /// Parse an English or Spanish aggregation name
    ///
    /// Returns `None` for unknown names; callers fall back to [`Self::Matches`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "count" | "conteo" => Some(Self::Count),
            "sum_profit" | "suma_ganancia" => Some(Self::SumProfit),
            "table_by_model" | "tabla_por_modelo" => Some(Self::TableByModel),
            "table_by_size" | "tabla_por_talle" => Some(Self::TableBySize),
            _ => None,
        }
    }

    /// Dataset aggregation this kind maps to
    #[must_use]
    pub fn aggregate_kind(self) -> AggregateKind {
        match self {
            Self::Count | Self::Matches => AggregateKind::Count,
            Self::SumProfit => AggregateKind::SumProfit,
            Self::TableByModel => AggregateKind::TableBy(GroupBy::Model),
            Self::TableBySize => AggregateKind::TableBy(GroupBy::Size),
        }
    }
}

/// Structured intent of a question
///
/// Unset fields impose no constraint. Set fields are exact-equality
/// constraints combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Canonical model name
    pub model: Option<String>,
    /// Shoe size
    pub size: Option<i64>,
    /// Status label
    pub status: Option<String>,
    /// Seller name
    pub seller: Option<String>,
    /// Summary to compute
    pub aggregation: AggregationKind,
}

impl FilterSpec {
    /// Unconstrained count
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// With size
    #[must_use]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// With status label
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// With seller
    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// With aggregation
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: AggregationKind) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// True if no field constraint is set
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.model.is_none() && self.size.is_none() && self.status.is_none() && self.seller.is_none()
    }

    /// Field constraints as dataset predicates
    #[must_use]
    pub fn to_predicates(&self) -> PredicateSet {
        let mut set = PredicateSet::new();
        if let Some(model) = &self.model {
            set.push(Predicate::equals(Field::Model, model.as_str()));
        }
        if let Some(size) = self.size {
            set.push(Predicate::equals(Field::Size, size));
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
