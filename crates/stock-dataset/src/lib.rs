//! Stock Dataset
//!
//! Read-only, in-memory snapshot of the sneaker stock sheet with the query
//! primitives the dashboard is built on.
//!
//! # Core Operations
//!
//! - **Load**: decode a CSV sheet (file or URL) or an Excel workbook into a [`Dataset`]
//! - **Filter**: keep rows matching a [`PredicateSet`] (AND of field constraints)
//! - **Aggregate**: row count, profit sum, or a [`ContingencyTable`]
//!
//! # Architecture
//!
//! ```text
//! DataSource → loader → Dataset → filter(PredicateSet) → Dataset → aggregate(kind) → Aggregate
//!                  ↑_______↓
//!                DatasetCache (TTL)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_dataset::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = DatasetCache::default();
//! let dataset = cache.load(&DataSource::parse("data/stock.csv")).await?;
//!
//! let sold = PredicateSet::new().with(Predicate::equals(Field::Status, "Vendido"));
//! let profit = dataset.filter(&sold).aggregate(AggregateKind::SumProfit);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aggregate;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod record;

// Re-exports for convenience
pub use aggregate::{Aggregate, AggregateKind, ContingencyTable, GroupBy, TableRow};
pub use cache::{CacheStats, DatasetCache, DEFAULT_STALENESS};
pub use dataset::{Dataset, InventorySummary, Predicate, PredicateSet, QuickFilter};
pub use error::{LoadError, LoadResult};
pub use loader::{parse_csv, parse_range, parse_workbook, DataSource, WORKBOOK_SHEET};
pub use record::{Field, FieldValue, Status, StockRecord, UnknownStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the stock dataset
    pub use crate::aggregate::{Aggregate, AggregateKind, ContingencyTable, GroupBy};
    pub use crate::cache::DatasetCache;
    pub use crate::dataset::{Dataset, Predicate, PredicateSet, QuickFilter};
    pub use crate::loader::DataSource;
    pub use crate::record::{Field, FieldValue, Status, StockRecord};
}
