//! Stock records and their field accessors
//!
//! One [`StockRecord`] is one pair of shoes in the spreadsheet. Filterable
//! columns are addressed through [`Field`] and compared as [`FieldValue`]s,
//! so predicates never need to know the concrete Rust type of a column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filterable columns of the stock sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Canonical model name
    Model,
    /// Shoe size
    Size,
    /// Stock status label
    Status,
    /// Seller first name (optional column)
    Seller,
}

impl Field {
    /// All filterable fields, in sheet order
    pub const ALL: [Field; 4] = [Field::Model, Field::Size, Field::Status, Field::Seller];

    /// Column name used in rendered tables
    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Model => "Modelo/Zapatilla",
            Self::Size => "Talle",
            Self::Status => "Estado",
            Self::Seller => "Vendedor",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A comparable cell value
///
/// `Int` sorts before `Text`, which keeps size keys in numeric order when a
/// table is grouped by size.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer cell (sizes)
    Int(i64),
    /// Text cell (model, status, seller)
    Text(String),
}

impl FieldValue {
    /// Text value helper
    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Whether a pair is still available or already sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    /// Pair is available
    #[serde(rename = "En stock")]
    InStock,
    /// Pair has been sold
    #[serde(rename = "Vendido")]
    Sold,
}

impl Status {
    /// Label stored in the sheet
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InStock => "En stock",
            Self::Sold => "Vendido",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised status label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en stock" | "in stock" | "stock" => Ok(Self::InStock),
            "vendido" | "vendida" | "sold" => Ok(Self::Sold),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// One row of the stock sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Canonical model name
    pub model: String,
    /// Shoe size
    pub size: i64,
    /// Availability
    pub status: Status,
    /// Seller who handled the sale, if the sheet tracks it
    pub seller: Option<String>,
    /// Net profit in pesos, if recorded
    pub profit: Option<f64>,
}

impl StockRecord {
    /// Create a record without seller or profit
    pub fn new(model: impl Into<String>, size: i64, status: Status) -> Self {
        Self {
            model: model.into(),
            size,
            status,
            seller: None,
            profit: None,
        }
    }

    /// With seller
    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// With profit
    #[must_use]
    pub fn with_profit(mut self, profit: f64) -> Self {
        self.profit = Some(profit);
        self
    }

    /// Read a field as a comparable value
    ///
    /// Returns `None` when an optional column has no value for this row.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Model => Some(FieldValue::Text(self.model.clone())),
            Field::Size => Some(FieldValue::Int(self.size)),
            Field::Status => Some(FieldValue::text(self.status.label())),
            Field::Seller => self.seller.clone().map(FieldValue::Text),
        }
    }

    /// Profit with null treated as zero
    #[inline]
    #[must_use]
    pub fn profit_or_zero(&self) -> f64 {
        self.profit.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_both_languages() {
        assert_eq!("En stock".parse::<Status>(), Ok(Status::InStock));
        assert_eq!("in stock".parse::<Status>(), Ok(Status::InStock));
        assert_eq!(" Vendido ".parse::<Status>(), Ok(Status::Sold));
        assert_eq!("SOLD".parse::<Status>(), Ok(Status::Sold));
        assert!("reservado".parse::<Status>().is_err());
    }

    #[test]
    fn missing_seller_reads_as_none() {
        let record = StockRecord::new("Roja", 40, Status::InStock);
        assert_eq!(record.get(Field::Seller), None);
        assert_eq!(record.get(Field::Size), Some(FieldValue::Int(40)));
        assert_eq!(record.get(Field::Status), Some(FieldValue::text("En stock")));
    }

    #[test]
    fn null_profit_is_zero() {
        let record = StockRecord::new("Roja", 40, Status::Sold);
        assert_eq!(record.profit_or_zero(), 0.0);
        assert_eq!(record.with_profit(12_500.0).profit_or_zero(), 12_500.0);
    }

    #[test]
    fn int_values_sort_numerically() {
        let mut values = vec![FieldValue::Int(41), FieldValue::Int(9), FieldValue::Int(38)];
        values.sort();
        assert_eq!(values, vec![FieldValue::Int(9), FieldValue::Int(38), FieldValue::Int(41)]);
    }
}
