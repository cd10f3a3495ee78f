//! Functional tests for loading the stock sheet from disk.
//!
//! Core guarantees exercised here:
//! - Spanish headers, an absent seller column and blank profits all load.
//! - The read-through cache serves repeated reads without touching the file
//!   again until the staleness window has passed.
//! - A sheet with a few unreadable rows still loads the readable ones.
//! - Load failures surface as typed errors and are never cached.

use std::io::Write;
use std::time::Duration;
use stock_dataset::{DataSource, DatasetCache, LoadError, Status};
use stock_test_utils::{sample_dataset, SAMPLE_CSV};
use tempfile::NamedTempFile;

fn write_sheet(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn source_for(file: &NamedTempFile) -> DataSource {
    DataSource::parse(&file.path().to_string_lossy())
}

/// Tenet: the sample sheet decodes to the sample dataset.
#[tokio::test]
async fn sample_sheet_round_trips_through_file() {
    let file = write_sheet(SAMPLE_CSV);
    let dataset = source_for(&file).load().await.unwrap();

    assert_eq!(dataset, sample_dataset());
    let summary = dataset.summary();
    assert_eq!(summary.total_pairs, 12);
    assert_eq!(summary.in_stock, 6);
    assert_eq!(summary.sold, 6);
    assert_eq!(summary.net_profit, 58_501);
}

/// Tenet: the seller column is optional and a sold pair may lack profit.
#[tokio::test]
async fn sheet_without_seller_column() {
    let file = write_sheet("Modelo,Talle,Estado,Ganancia\nRoja,41,Vendido,\nRoja,40,En stock,\n");
    let dataset = source_for(&file).load().await.unwrap();

    assert_eq!(dataset.len(), 2);
    assert!(dataset.records().iter().all(|r| r.seller.is_none()));
    assert_eq!(dataset.records()[0].status, Status::Sold);
    assert_eq!(dataset.profit_sum(), 0);
}

/// Tenet: a missing file is an I/O error naming the path.
#[tokio::test]
async fn missing_file_is_io_error() {
    let source = DataSource::parse("/nonexistent/inventario.csv");
    let err = source.load().await.unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/inventario.csv"));
}

/// Tenet: a second read inside the window is served from the cache.
#[tokio::test]
async fn cache_serves_stale_snapshot_within_window() {
    let file = write_sheet(SAMPLE_CSV);
    let source = source_for(&file);
    let cache = DatasetCache::new(Duration::from_secs(30));

    let first = cache.load(&source).await.unwrap();
    std::fs::write(file.path(), "model,size,status\nRoja,40,sold\n").unwrap();
    let second = cache.load(&source).await.unwrap();

    assert_eq!(first.len(), 12);
    assert_eq!(second.len(), 12);
}

/// Tenet: a read after the window reloads the sheet.
#[tokio::test]
async fn cache_reloads_after_window() {
    let file = write_sheet(SAMPLE_CSV);
    let source = source_for(&file);
    let cache = DatasetCache::new(Duration::from_millis(50));

    assert_eq!(cache.load(&source).await.unwrap().len(), 12);
    std::fs::write(file.path(), "model,size,status\nRoja,40,sold\n").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.load(&source).await.unwrap().len(), 1);
}

/// Tenet: a broken sheet is reported and the next read tries again.
#[tokio::test]
async fn failed_load_is_not_cached() {
    let file = write_sheet("model,status\nRoja,sold\n");
    let source = source_for(&file);
    let cache = DatasetCache::default();

    let err = cache.load(&source).await.unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn("size")));

    std::fs::write(file.path(), "model,size,status\nRoja,40,sold\n").unwrap();
    assert_eq!(cache.load(&source).await.unwrap().len(), 1);
}

/// Tenet: one bad row does not take the rest of the sheet down.
#[tokio::test]
async fn bad_rows_do_not_block_the_load() {
    let file = write_sheet(
        "Modelo,Talle,Estado,Vendedor,Ganancia\n\
         Roja,40,,,\n\
         Roja,41,Vendido,Enzo,$ 12.000\n\
         Roja,42,Reservado,,\n\
         Air Max Blanca,41,En stock,,\n",
    );
    let dataset = source_for(&file).load().await.unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.summary().sold, 1);
    assert_eq!(dataset.profit_sum(), 12_000);
}

/// Tenet: an Excel file is opened as a workbook, not decoded as CSV.
#[tokio::test]
async fn excel_path_is_read_as_workbook() {
    let mut file = tempfile::Builder::new()
        .prefix("Stock_Zapatillas_Enzo")
        .suffix(".xlsx")
        .tempfile()
        .unwrap();
    file.write_all(b"PK\x03\x04not really a workbook").unwrap();
    file.flush().unwrap();

    let err = source_for(&file).load().await.unwrap_err();

    assert!(matches!(err, LoadError::Workbook(_)), "got {err:?}");
    assert!(!matches!(err, LoadError::MissingColumn(_)));
}
