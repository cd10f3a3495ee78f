//! Loading the stock sheet
//!
//! Sources are either a local file or an HTTP(S) endpoint serving CSV.
//! Shared Google Sheets links are rewritten to their CSV export URL. Local
//! Excel workbooks (`.xlsx`, `.xls` and friends) are read from their
//! `Stock` sheet.
//!
//! Headers are matched case-insensitively against English and Spanish
//! names, so both `model,size,status` and `Modelo/Zapatilla,Talle,Estado`
//! sheets load. `seller` and `profit` columns are optional.
//!
//! A row that cannot be decoded (blank status, unknown status, unreadable
//! size or amount) is skipped with a warning; the rest of the sheet loads.

use crate::dataset::Dataset;
use crate::error::{LoadError, LoadResult};
use crate::record::{Status, StockRecord};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

/// Sheet read from Excel workbooks
pub const WORKBOOK_SHEET: &str = "Stock";

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

const MODEL_HEADERS: &[&str] = &["model", "modelo", "modelo/zapatilla", "zapatilla"];
const SIZE_HEADERS: &[&str] = &["size", "talle"];
const STATUS_HEADERS: &[&str] = &["status", "estado"];
const SELLER_HEADERS: &[&str] = &["seller", "vendedor"];
const PROFIT_HEADERS: &[&str] = &["profit", "ganancia"];

/// Amounts written with dot grouping and an optional decimal comma:
/// `12.000`, `1.250.000,50`, `99,5`
static LOCALE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d{1,3}(\.\d{3})+(,\d+)?|\d+,\d+)$").expect("amount pattern is valid")
});

/// Where the sheet comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Local CSV file or Excel workbook
    File(PathBuf),
    /// Remote CSV endpoint
    Url(String),
}

impl DataSource {
    /// Interpret a path or URL string
    ///
    /// Google Sheets `/edit` links become `/export?format=csv` links,
    /// keeping the `gid` of the selected tab when present.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(google_sheet_export_url(raw).unwrap_or_else(|| raw.to_string()))
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    /// Stable key for caching
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.to_string()
    }

    /// Read and decode the sheet
    pub async fn load(&self) -> LoadResult<Dataset> {
        match self {
            Self::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| LoadError::io_error(path, e))?;
                if is_workbook(path) {
                    parse_workbook(Cursor::new(bytes))
                } else {
                    parse_csv(bytes.as_slice())
                }
            }
            Self::Url(url) => {
                let response = reqwest::get(url).await.map_err(|source| LoadError::Fetch {
                    url: url.clone(),
                    source,
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let body = response.bytes().await.map_err(|source| LoadError::Fetch {
                    url: url.clone(),
                    source,
                })?;
                parse_csv(body.as_ref())
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn google_sheet_export_url(url: &str) -> Option<String> {
    const MARKER: &str = "docs.google.com/spreadsheets/d/";
    let start = url.find(MARKER)? + MARKER.len();
    let rest = &url[start..];
    if rest.contains("/export") || rest.contains("output=csv") {
        return None;
    }
    let id = rest.split(['/', '?', '#']).next().filter(|id| !id.is_empty())?;
    let gid = url
        .split(['?', '&', '#'])
        .find_map(|part| part.strip_prefix("gid="));
    Some(match gid {
        Some(gid) => format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv&gid={gid}"),
        None => format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv"),
    })
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    model: usize,
    size: usize,
    status: usize,
    seller: Option<usize>,
    profit: Option<usize>,
}

impl ColumnMap {
    fn resolve<I, S>(headers: I) -> LoadResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        let find = |aliases: &[&str]| names.iter().position(|h| aliases.contains(&h.as_str()));
        Ok(Self {
            model: find(MODEL_HEADERS).ok_or(LoadError::MissingColumn("model"))?,
            size: find(SIZE_HEADERS).ok_or(LoadError::MissingColumn("size"))?,
            status: find(STATUS_HEADERS).ok_or(LoadError::MissingColumn("status"))?,
            seller: find(SELLER_HEADERS),
            profit: find(PROFIT_HEADERS),
        })
    }
}

/// One cell as read from the source
///
/// CSV cells are always text; workbook cells may already be numbers, which
/// are taken as they are rather than re-read through the locale rules.
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> Cell<'a> {
    const EMPTY: Cell<'static> = Cell::Text("");

    fn is_empty(self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }

    fn text(self) -> Cow<'a, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.trim()),
            Cell::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

impl<'a> From<&'a Data> for Cell<'a> {
    #[allow(clippy::cast_precision_loss)]
    fn from(data: &'a Data) -> Self {
        match data {
            Data::String(s) => Cell::Text(s),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            _ => Cell::EMPTY,
        }
    }
}

/// Collects decoded rows, skipping the ones that cannot be read
struct RowDecoder {
    columns: ColumnMap,
    records: Vec<StockRecord>,
    skipped: usize,
}

impl RowDecoder {
    fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            records: Vec::new(),
            skipped: 0,
        }
    }

    fn push(&mut self, line: usize, cells: &[Cell<'_>]) {
        if cells.iter().all(|c| c.is_empty()) {
            return;
        }
        match parse_row(cells, self.columns, line) {
            Ok(record) => self.records.push(record),
            Err(err) => {
                tracing::warn!(line, error = %err, "skipping unreadable row");
                self.skipped += 1;
            }
        }
    }

    fn finish(self) -> Dataset {
        tracing::debug!(rows = self.records.len(), skipped = self.skipped, "decoded stock sheet");
        Dataset::new(self.records)
    }
}

/// Decode CSV bytes into a dataset
pub fn parse_csv<R: Read>(reader: R) -> LoadResult<Dataset> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut decoder = RowDecoder::new(ColumnMap::resolve(reader.headers()?)?);

    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| usize::try_from(p.line()).unwrap_or(usize::MAX));
        let cells: Vec<Cell<'_>> = row.iter().map(Cell::Text).collect();
        decoder.push(line, &cells);
    }

    Ok(decoder.finish())
}

/// Decode an Excel or OpenDocument workbook from its `Stock` sheet
pub fn parse_workbook<RS>(reader: RS) -> LoadResult<Dataset>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(reader)?;
    if !workbook.sheet_names().iter().any(|name| name == WORKBOOK_SHEET) {
        return Err(LoadError::MissingSheet(WORKBOOK_SHEET));
    }
    let range = workbook.worksheet_range(WORKBOOK_SHEET)?;
    parse_range(&range)
}

/// Decode a worksheet range whose first row holds the headers
pub fn parse_range(range: &Range<Data>) -> LoadResult<Dataset> {
    let first_line = range
        .start()
        .map_or(1, |(row, _)| usize::try_from(row).unwrap_or(usize::MAX).saturating_add(1));
    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::MissingColumn("model"))?;
    let mut decoder = RowDecoder::new(ColumnMap::resolve(header.iter().map(ToString::to_string))?);

    for (offset, row) in rows.enumerate() {
        let cells: Vec<Cell<'_>> = row.iter().map(Cell::from).collect();
        decoder.push(first_line + offset + 1, &cells);
    }

    Ok(decoder.finish())
}

fn parse_row(cells: &[Cell<'_>], columns: ColumnMap, line: usize) -> LoadResult<StockRecord> {
    let cell = |idx: usize| cells.get(idx).copied().unwrap_or(Cell::EMPTY);
    let optional = |idx: Option<usize>| idx.map(cell).filter(|c| !c.is_empty());

    let model = cell(columns.model).text();
    if model.is_empty() {
        return Err(LoadError::invalid_value(line, "model", model));
    }

    let size_cell = cell(columns.size);
    let size = match size_cell {
        Cell::Number(n) => whole_number(n),
        Cell::Text(raw) => parse_size(raw.trim()),
    }
    .ok_or_else(|| LoadError::invalid_value(line, "size", size_cell.text()))?;

    let raw_status = cell(columns.status).text();
    let status: Status = raw_status
        .parse()
        .map_err(|_| LoadError::invalid_value(line, "status", raw_status.as_ref()))?;

    let profit = optional(columns.profit)
        .map(|c| {
            let amount = match c {
                Cell::Number(n) => Some(n).filter(|v| v.is_finite()),
                Cell::Text(raw) => parse_amount(raw),
            };
            amount.ok_or_else(|| LoadError::invalid_value(line, "profit", c.text()))
        })
        .transpose()?;

    Ok(StockRecord {
        model: model.into_owned(),
        size,
        status,
        seller: optional(columns.seller).map(|c| c.text().into_owned()),
        profit,
    })
}

/// Sizes come as `41` or, from spreadsheet exports, `41.0`
fn parse_size(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    whole_number(raw.parse::<f64>().ok()?)
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Peso amounts: `12000.5`, `$ 12.000`, `$ 12.000,50`, `-$ 1.500`
///
/// Dot-grouped thousands and a decimal comma are read in the business
/// locale; anything else is parsed as a plain number.
fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let cleaned = rest.trim_start_matches('$').trim();

    let value: f64 = if LOCALE_AMOUNT.is_match(cleaned) {
        cleaned.replace('.', "").replace(',', ".").parse().ok()?
    } else {
        cleaned.parse().ok()?
    };
    value
        .is_finite()
        .then_some(if negative { -value } else { value })
}
