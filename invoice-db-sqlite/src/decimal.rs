//! Money columns are stored as TEXT so no precision is lost to REAL.

use std::str::FromStr;

use invoice_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

fn column_error(
    column: &str,
    detail: impl std::fmt::Display,
) -> RepositoryError {
    RepositoryError::Database(format!("column '{column}': {detail}"))
}

/// Reads a money or rate column, treating NULL as zero.
///
/// INTEGER and REAL cells are accepted as well, for rows edited by hand.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    get_optional_decimal(row, column).map(Option::unwrap_or_default)
}

/// Like [`get_decimal`] but keeps NULL distinct from zero.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw = row
        .try_get_raw(column)
        .map_err(|e| column_error(column, e))?;
    if raw.is_null() {
        return Ok(None);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "TEXT" => {
            let text: String = row.try_get(column).map_err(|e| column_error(column, e))?;
            Decimal::from_str(text.trim())
                .map_err(|e| column_error(column, format_args!("'{text}' is not a decimal ({e})")))?
        }
        "INTEGER" => Decimal::from(
            row.try_get::<i64, _>(column)
                .map_err(|e| column_error(column, e))?,
        ),
        "REAL" => {
            let real: f64 = row.try_get(column).map_err(|e| column_error(column, e))?;
            Decimal::try_from(real).map_err(|e| column_error(column, e))?
        }
        other => return Err(column_error(column, format_args!("cannot hold a decimal as {other}"))),
    };

    Ok(Some(value))
}

/// Text form written to money columns. The scale is kept, so `113.00` reads
/// back as `113.00`.
pub fn decimal_to_text(d: Decimal) -> String {
    d.to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    /// Evaluates `expr` in SQLite and returns the row with it as column `v`.
    async fn select(expr: &str) -> SqliteRow {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        sqlx::query(&format!("SELECT {expr} AS v"))
            .fetch_one(&pool)
            .await
            .expect("select literal")
    }

    #[tokio::test]
    async fn text_keeps_its_scale() {
        let row = select("'112.98'").await;

        let value = get_decimal(&row, "v").unwrap();

        assert_eq!(value.to_string(), "112.98");
    }

    #[tokio::test]
    async fn text_keeps_sub_cent_digits() {
        assert_eq!(get_decimal(&select("'0.149600250'").await, "v"), Ok(dec!(0.14960025)));
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_ignored() {
        assert_eq!(get_decimal(&select("' 13 '").await, "v"), Ok(dec!(13)));
    }

    #[tokio::test]
    async fn integer_cells_are_accepted() {
        assert_eq!(get_decimal(&select("-250").await, "v"), Ok(dec!(-250)));
    }

    #[tokio::test]
    async fn real_cells_are_accepted() {
        assert_eq!(get_decimal(&select("65.5").await, "v"), Ok(dec!(65.5)));
    }

    #[tokio::test]
    async fn null_reads_as_zero_or_none() {
        let row = select("NULL").await;

        assert_eq!(get_decimal(&row, "v"), Ok(Decimal::ZERO));
        assert_eq!(get_optional_decimal(&row, "v"), Ok(None));
    }

    #[tokio::test]
    async fn garbage_text_is_rejected() {
        let err = get_decimal(&select("'twelve'").await, "v").unwrap_err();

        assert!(
            matches!(&err, RepositoryError::Database(msg) if msg.starts_with("column 'v': 'twelve' is not a decimal")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn blobs_are_rejected() {
        assert_eq!(
            get_decimal(&select("x'00ff'").await, "v"),
            Err(RepositoryError::Database(
                "column 'v': cannot hold a decimal as BLOB".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn missing_column_is_an_error() {
        let err = get_optional_decimal(&select("1").await, "balance_due").unwrap_err();

        assert!(matches!(err, RepositoryError::Database(msg) if msg.starts_with("column 'balance_due':")));
    }

    #[test]
    fn text_form_keeps_trailing_zeros_and_sign() {
        assert_eq!(decimal_to_text(dec!(113.00)), "113.00");
        assert_eq!(decimal_to_text(dec!(-1.30)), "-1.30");
        assert_eq!(decimal_to_text(dec!(37.375)), "37.375");
    }
}
