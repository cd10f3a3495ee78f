//! Testing utilities for the stock dashboard workspace
//!
//! Shared fixtures: a small stock sheet and a scripted completion client.

#![allow(missing_docs)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use stock_dataset::{Dataset, Status, StockRecord};
use stock_query::{CompletionClient, CompletionRequest, ExtractError, ExtractResult};

/// The sample sheet as CSV, Spanish headers
pub const SAMPLE_CSV: &str = "\
Modelo/Zapatilla,Talle,Estado,Vendedor,Ganancia
Air Max Blanca,41,En stock,,
Air Max Blanca,41,En stock,,
Air Max Blanca,42,Vendido,Tefi,15000
Air Max Negra,40,En stock,,
Air Max Negra,41,Vendido,Enzo,12000.5
Gris tela,38,En stock,,
Gris tela,39,Vendido,Laura,
Roja,36,En stock,,
Roja,44,Vendido,Tefi,8000
Combinada,43,En stock,,
Combinada,41,Vendido,Enzo,9500.75
Air Max Blanca,41,Vendido,Laura,14000
";

/// Twelve pairs: six in stock, six sold, net profit 58.501
pub fn sample_dataset() -> Dataset {
    Dataset::new(vec![
        StockRecord::new("Air Max Blanca", 41, Status::InStock),
        StockRecord::new("Air Max Blanca", 41, Status::InStock),
        StockRecord::new("Air Max Blanca", 42, Status::Sold)
            .with_seller("Tefi")
            .with_profit(15_000.0),
        StockRecord::new("Air Max Negra", 40, Status::InStock),
        StockRecord::new("Air Max Negra", 41, Status::Sold)
            .with_seller("Enzo")
            .with_profit(12_000.5),
        StockRecord::new("Gris tela", 38, Status::InStock),
        StockRecord::new("Gris tela", 39, Status::Sold).with_seller("Laura"),
        StockRecord::new("Roja", 36, Status::InStock),
        StockRecord::new("Roja", 44, Status::Sold)
            .with_seller("Tefi")
            .with_profit(8_000.0),
        StockRecord::new("Combinada", 43, Status::InStock),
        StockRecord::new("Combinada", 41, Status::Sold)
            .with_seller("Enzo")
            .with_profit(9_500.75),
        StockRecord::new("Air Max Blanca", 41, Status::Sold)
            .with_seller("Laura")
            .with_profit(14_000.0),
    ])
}

/// Completion client that replays a fixed reply and counts calls
#[derive(Debug)]
pub struct CannedCompletion {
    credential: bool,
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl CannedCompletion {
    /// Reply with `text` on every request
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            credential: true,
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every request as an unreachable service would
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            credential: true,
            reply: Err(detail.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Client with no credential configured
    pub fn without_credential() -> Self {
        Self {
            credential: false,
            reply: Ok("{}".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for CannedCompletion {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn complete(&self, _request: &CompletionRequest) -> ExtractResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .map_err(|detail| ExtractError::service(503, detail))
    }
}
