//! Database connection capability.
//!
//! [`Connection`] is the narrow surface storm needs from a driver: run a
//! statement, run a query and collect its rows, read a scalar, and check
//! connectivity. Implementations exist for `tokio_postgres::Client`, the
//! `deadpool_postgres::Pool` (feature `pool`), and the in-memory double in
//! [`crate::testing`].

use crate::error::{OrmError, OrmResult};
use crate::value::DbValue;
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::{ToSql, Type};

/// Format used to render `timestamp` (without time zone) columns as text.
pub const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A fully collected result set: column names plus row values in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<DbValue>>,
}

impl RowSet {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row (builder style).
    pub fn row(mut self, values: impl IntoIterator<Item = DbValue>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First value of the first row, or `Null` when there is none.
    pub fn into_scalar(self) -> DbValue {
        self.rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default()
    }

    /// Decode driver rows into a `RowSet`.
    pub fn from_rows(rows: &[Row]) -> OrmResult<Self> {
        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|idx| decode_column(row, idx))
                    .collect::<OrmResult<Vec<_>>>()
            })
            .collect::<OrmResult<Vec<_>>>()?;

        Ok(Self { columns, rows })
    }
}

/// Decode one column of a driver row into a [`DbValue`].
fn decode_column(row: &Row, idx: usize) -> OrmResult<DbValue> {
    let column = &row.columns()[idx];

    macro_rules! get {
        ($t:ty) => {
            row.try_get::<_, Option<$t>>(idx)?
        };
    }

    let value = match *column.type_() {
        Type::BOOL => get!(bool).map(DbValue::Bool),
        Type::CHAR => get!(i8).map(|v| DbValue::Int16(i16::from(v))),
        Type::INT2 => get!(i16).map(DbValue::Int16),
        Type::INT4 => get!(i32).map(DbValue::Int32),
        Type::INT8 => get!(i64).map(DbValue::Int64),
        Type::OID => get!(u32).map(|v| DbValue::Int64(i64::from(v))),
        Type::FLOAT4 => get!(f32).map(DbValue::Float32),
        Type::FLOAT8 => get!(f64).map(DbValue::Float64),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get!(String).map(DbValue::Text)
        }
        Type::BYTEA => get!(Vec<u8>).map(DbValue::Bytes),
        Type::UUID => get!(uuid::Uuid).map(|v| DbValue::Text(v.to_string())),
        Type::TIMESTAMPTZ => {
            get!(chrono::DateTime<chrono::Utc>).map(|v| DbValue::Text(v.to_rfc3339()))
        }
        Type::TIMESTAMP => get!(chrono::NaiveDateTime)
            .map(|v| DbValue::Text(v.format(NAIVE_DATETIME_FORMAT).to_string())),
        Type::DATE => get!(chrono::NaiveDate).map(|v| DbValue::Text(v.to_string())),
        Type::JSON | Type::JSONB => get!(serde_json::Value).map(|v| DbValue::Text(v.to_string())),
        _ => {
            return Err(OrmError::Other(format!(
                "unsupported column type `{}` for column '{}'",
                column.type_().name(),
                column.name()
            )));
        }
    };
    Ok(value.unwrap_or_default())
}

fn params(args: &[DbValue]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|a| a as &(dyn ToSql + Sync)).collect()
}

/// The database capability storm runs statements against.
pub trait Connection: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        args: &[DbValue],
    ) -> impl Future<Output = OrmResult<u64>> + Send;

    /// Execute a query and collect every row.
    fn query_rows(
        &self,
        sql: &str,
        args: &[DbValue],
    ) -> impl Future<Output = OrmResult<RowSet>> + Send;

    /// Execute a query and return the first column of the first row.
    ///
    /// Returns `Null` when the query produces no rows.
    fn query_scalar(
        &self,
        sql: &str,
        args: &[DbValue],
    ) -> impl Future<Output = OrmResult<DbValue>> + Send {
        async move { Ok(self.query_rows(sql, args).await?.into_scalar()) }
    }

    /// Verify connectivity.
    fn ping(&self) -> impl Future<Output = OrmResult<()>> + Send {
        async move { self.query_scalar("SELECT 1", &[]).await.map(|_| ()) }
    }
}

impl Connection for tokio_postgres::Client {
    async fn execute(&self, sql: &str, args: &[DbValue]) -> OrmResult<u64> {
        let params = params(args);
        tokio_postgres::Client::execute(self, sql, &params)
            .await
            .map_err(OrmError::from)
    }

    async fn query_rows(&self, sql: &str, args: &[DbValue]) -> OrmResult<RowSet> {
        let params = params(args);
        let rows = tokio_postgres::Client::query(self, sql, &params).await?;
        RowSet::from_rows(&rows)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Pool {
    async fn execute(&self, sql: &str, args: &[DbValue]) -> OrmResult<u64> {
        let client = self.get().await?;
        let client: &tokio_postgres::Client = &client;
        Connection::execute(client, sql, args).await
    }

    async fn query_rows(&self, sql: &str, args: &[DbValue]) -> OrmResult<RowSet> {
        let client = self.get().await?;
        let client: &tokio_postgres::Client = &client;
        Connection::query_rows(client, sql, args).await
    }
}
