// Query executor abstraction
// Statements with positional placeholders in, JSON rows out

use crate::db::DbPool;
use crate::errors::DatabaseError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row as _, TypeInfo};
use tracing::instrument;

/// A result row: column name (or alias) mapped to its typed value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A positional statement parameter.
///
/// Every variant carries an optional payload so that a NULL still binds with
/// the store type of the column it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i64>),
    Text(Option<String>),
    /// Exact decimal kept as its string form; cast to `numeric` at the placeholder
    Numeric(Option<String>),
}

impl SqlValue {
    pub fn numeric(value: Option<String>) -> Self {
        SqlValue::Numeric(value)
    }

    /// Type cast appended to the placeholder, if the value needs one
    pub fn cast(&self) -> Option<&'static str> {
        match self {
            SqlValue::Numeric(_) => Some("numeric"),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(Some(value))
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(Some(value.into()))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(Some(value.into()))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(Some(value))
    }
}

impl From<Option<i32>> for SqlValue {
    fn from(value: Option<i32>) -> Self {
        SqlValue::Int(value.map(i64::from))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(Some(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        SqlValue::Text(value)
    }
}

/// Executes a statement template against the store.
///
/// Repositories hold one of these instead of reaching for a global handle, so
/// tests can substitute a double.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `sql` with `params` bound to `$1..$n` in order and return every row
    async fn query(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, DatabaseError>;
}

#[async_trait]
impl QueryExecutor for DbPool {
    #[instrument(skip(self, sql, params), fields(param_count = params.len()))]
    async fn query(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, DatabaseError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlValue::Bool(v) => query.bind(v),
                SqlValue::Int(v) => query.bind(v),
                SqlValue::Text(v) | SqlValue::Numeric(v) => query.bind(v),
            };
        }

        let rows = query.fetch_all(self.pool()).await?;
        tracing::debug!(row_count = rows.len(), "Statement executed");

        rows.iter().map(row_to_json).collect()
    }
}

/// Convert a Postgres row into a JSON row keyed by column name
fn row_to_json(row: &PgRow) -> Result<Row, DatabaseError> {
    let mut map = Row::new();

    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "BOOL" => json!(row.try_get::<Option<bool>, _>(i)?),
            "INT2" => json!(row.try_get::<Option<i16>, _>(i)?),
            "INT4" => json!(row.try_get::<Option<i32>, _>(i)?),
            "INT8" => json!(row.try_get::<Option<i64>, _>(i)?),
            "FLOAT4" => json!(row.try_get::<Option<f32>, _>(i)?),
            "FLOAT8" => json!(row.try_get::<Option<f64>, _>(i)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => json!(row.try_get::<Option<String>, _>(i)?),
            other => {
                return Err(DatabaseError::QueryFailed(format!(
                    "Unsupported column type {} for column {}",
                    other,
                    column.name()
                )))
            }
        };
        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

/// Decode a row into a typed record
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, DatabaseError> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Executor double: replays queued responses and records every call
    #[derive(Default)]
    pub struct RecordingExecutor {
        responses: Mutex<VecDeque<Result<Vec<Row>, DatabaseError>>>,
        calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
    }

    impl RecordingExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, rows: Vec<serde_json::Value>) -> Self {
            let rows = rows
                .into_iter()
                .map(|value| match value {
                    serde_json::Value::Object(map) => map,
                    other => panic!("row must be a JSON object, got {}", other),
                })
                .collect();
            self.responses.lock().unwrap().push_back(Ok(rows));
            self
        }

        pub fn fail(self, err: DatabaseError) -> Self {
            self.responses.lock().unwrap().push_back(Err(err));
            self
        }

        pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn query(
            &self,
            sql: &str,
            params: Vec<SqlValue>,
        ) -> Result<Vec<Row>, DatabaseError> {
            self.calls.lock().unwrap().push((sql.to_string(), params));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        company_handle: String,
        salary: Option<i32>,
    }

    #[test]
    fn test_from_row_decodes_camel_case_aliases() {
        let row = json!({"companyHandle": "c1", "salary": null});
        let serde_json::Value::Object(row) = row else {
            unreachable!()
        };

        let sample: Sample = from_row(row).unwrap();
        assert_eq!(
            sample,
            Sample {
                company_handle: "c1".to_string(),
                salary: None
            }
        );
    }

    #[test]
    fn test_from_row_reports_decode_failure() {
        let serde_json::Value::Object(row) = json!({"salary": 1}) else {
            unreachable!()
        };
        let result = from_row::<Sample>(row);
        assert!(matches!(result, Err(DatabaseError::RowDecodeFailed(_))));
    }

    #[test]
    fn test_numeric_values_carry_a_cast() {
        assert_eq!(SqlValue::numeric(Some("0.5".into())).cast(), Some("numeric"));
        assert_eq!(SqlValue::from(10).cast(), None);
    }
}
