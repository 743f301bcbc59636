//! CSV loader for document line items.
//!
//! ## CSV Format
//!
//! Columns are matched by header name, so their order does not matter.
//! Header names are case-sensitive.
//!
//! | Column        | Required | Type    | Notes                                         |
//! |---------------|----------|---------|-----------------------------------------------|
//! | `description` | yes      | string  | Free text                                     |
//! | `quantity`    | yes      | decimal | May be fractional, e.g. `2.5`                 |
//! | `rate`        | yes      | decimal | Unit price; negative for discount lines       |
//! | `unit`        | no       | string  | e.g. `hr`; leave empty for none               |
//! | `tax_rate`    | no       | decimal | Percent; leave empty to use the default rate  |
//!
//! Decimal cells may use commas as thousands separators (`"1,250.00"`).
//!
//! ### Example
//!
//! ```csv
//! description,quantity,unit,rate,tax_rate
//! Site visit,1,,150.00,
//! Labour,2.5,hr,65.00,13
//! Permit fee,1,,"1,200.00",0
//! ```
use std::path::{Path, PathBuf};

use invoice_core::LineItem;
use serde::Deserialize;
use tracing::debug;

use crate::utils::{ParseDecimalError, parse_decimal, parse_optional_decimal};

/// Mirrors the CSV layout. Numbers stay as text so thousands separators
/// can be stripped before parsing.
#[derive(Debug, Deserialize)]
struct CsvRow {
    description: String,
    quantity: String,
    rate: String,
    unit: Option<String>,
    tax_rate: Option<String>,
}

/// Errors that can occur while loading line items.
#[derive(Debug, thiserror::Error)]
pub enum LineItemLoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, a missing required column, or a ragged row.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based; the header is row 0.
    #[error("invalid {column} on row {row}: {source}")]
    InvalidNumber {
        column: &'static str,
        row: usize,
        #[source]
        source: ParseDecimalError,
    },

    #[error("missing {column} on row {row}")]
    MissingNumber { column: &'static str, row: usize },

    #[error("line item on row {row} has no description")]
    MissingDescription { row: usize },
}

fn number(
    column: &'static str,
    value: &str,
    row: usize,
) -> Result<rust_decimal::Decimal, LineItemLoadError> {
    if value.trim().is_empty() {
        return Err(LineItemLoadError::MissingNumber { column, row });
    }
    parse_decimal(value).map_err(|source| LineItemLoadError::InvalidNumber {
        column,
        row,
        source,
    })
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<LineItem, LineItemLoadError> {
    if row.description.is_empty() {
        return Err(LineItemLoadError::MissingDescription { row: row_number });
    }

    let tax_rate = match row.tax_rate.as_deref() {
        Some(cell) => parse_optional_decimal(cell).map_err(|source| {
            LineItemLoadError::InvalidNumber {
                column: "tax_rate",
                row: row_number,
                source,
            }
        })?,
        None => None,
    };

    Ok(LineItem {
        quantity: number("quantity", &row.quantity, row_number)?,
        rate: number("rate", &row.rate, row_number)?,
        description: row.description,
        unit: row.unit.filter(|u| !u.is_empty()),
        tax_rate,
    })
}

/// Parses CSV text and returns the line items in file order.
///
/// # Errors
///
/// * [`LineItemLoadError::Parse`] if the CSV is structurally invalid or a
///   required column is missing.
/// * [`LineItemLoadError::InvalidNumber`] if a numeric cell does not parse,
///   or [`LineItemLoadError::MissingNumber`] if a required one is empty.
/// * [`LineItemLoadError::MissingDescription`] for a blank description.
pub fn load_from_str(input: &str) -> Result<Vec<LineItem>, LineItemLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

/// Reads a file from disk and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<LineItem>, LineItemLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LineItemLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let items = load_from_str(&contents)?;
    debug!(path = %path.display(), count = items.len(), "loaded line items");
    Ok(items)
}
