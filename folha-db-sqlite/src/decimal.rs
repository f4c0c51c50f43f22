use std::str::FromStr;

use folha_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads a decimal column.
///
/// Amounts are written as TEXT so no precision is lost, but rows edited by
/// hand may hold INTEGER or REAL values; both are accepted. NULL reads as 0.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{column}': {e}"))
            })?;
            parse_text(&val).ok_or_else(|| {
                RepositoryError::Database(format!(
                    "Column '{column}' holds non-numeric text '{val}'"
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{column}': {e}"))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{column}': {e}"))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {val} to Decimal: {e}"))
            })
        }
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{other}' for column '{column}'"
        ))),
    }
}

/// Reads a nullable decimal column, keeping NULL as `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    get_decimal(row, column).map(Some)
}

/// Storage form of a decimal.
pub fn decimal_to_text(d: Decimal) -> String {
    d.to_string()
}

fn parse_text(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                value
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");

        pool
    }

    async fn read_back(literal: &str) -> SqliteRow {
        let pool = setup_test_db().await;
        sqlx::query(&format!(
            "INSERT INTO test_decimals (id, value) VALUES (1, {literal})"
        ))
        .execute(&pool)
        .await
        .expect("Failed to insert test data");

        sqlx::query("SELECT value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row")
    }

    #[tokio::test]
    async fn get_decimal_from_text_keeps_precision() {
        let row = read_back("'1819.26'").await;

        assert_eq!(get_decimal(&row, "value"), Ok(dec!(1819.26)));
    }

    #[tokio::test]
    async fn get_decimal_from_integer() {
        let row = read_back("1412").await;

        assert_eq!(get_decimal(&row, "value"), Ok(dec!(1412)));
    }

    #[tokio::test]
    async fn get_decimal_from_real() {
        let row = read_back("0.075").await;

        assert_eq!(get_decimal(&row, "value"), Ok(dec!(0.075)));
    }

    #[tokio::test]
    async fn get_decimal_from_null_is_zero() {
        let row = read_back("NULL").await;

        assert_eq!(get_decimal(&row, "value"), Ok(dec!(0)));
    }

    #[tokio::test]
    async fn get_decimal_rejects_non_numeric_text() {
        let row = read_back("'abc'").await;

        assert!(matches!(
            get_decimal(&row, "value"),
            Err(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn get_decimal_missing_column() {
        let row = read_back("1").await;

        assert!(matches!(
            get_decimal(&row, "nope"),
            Err(RepositoryError::Database(msg)) if msg.contains("nope")
        ));
    }

    #[tokio::test]
    async fn get_optional_decimal_null_is_none() {
        let row = read_back("NULL").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(None));
    }

    #[tokio::test]
    async fn get_optional_decimal_text_is_some() {
        let row = read_back("'7786.02'").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(Some(dec!(7786.02))));
    }

    #[test]
    fn decimal_to_text_round_trips_scale() {
        assert_eq!(decimal_to_text(dec!(0.075)), "0.075");
        assert_eq!(decimal_to_text(dec!(2000.00)), "2000.00");
    }
}
