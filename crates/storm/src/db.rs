//! The `Storm` instance: record persistence over a [`Connection`].

use crate::client::{Connection, RowSet};
use crate::config::StormConfig;
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::schema::Record;
use crate::statement::{self, Statement};
use crate::trace::{self, Op};
use crate::value::DbValue;

/// Entry point for mapping records to and from a database.
///
/// `Storm` owns a connection capability and the configuration used when
/// issuing statements. It holds no other state, so a single instance can be
/// shared by concurrent callers when `C` is (a pool is).
#[derive(Debug, Clone)]
pub struct Storm<C> {
    conn: C,
    config: StormConfig,
}

#[cfg(feature = "pool")]
impl Storm<deadpool_postgres::Pool> {
    /// Open a pooled PostgreSQL connection and verify it with a ping.
    ///
    /// `driver` must be `"postgres"` (or `"postgresql"`).
    pub async fn open(driver: &str, url: &str) -> OrmResult<Self> {
        Self::open_with_config(driver, url, StormConfig::default()).await
    }

    pub async fn open_with_config(driver: &str, url: &str, config: StormConfig) -> OrmResult<Self> {
        if !matches!(driver, "postgres" | "postgresql") {
            return Err(OrmError::Connection(format!(
                "unsupported driver `{driver}`, expected `postgres`"
            )));
        }

        let pool = connect_pool(url, config.max_pool_size)?;
        pool.ping()
            .await
            .map_err(|e| OrmError::Connection(format!("failed to connect to database: {e}")))?;

        tracing::info!(
            target: "storm",
            driver,
            max_pool_size = config.max_pool_size,
            "database connection established"
        );
        Ok(Self { conn: pool, config })
    }
}

/// Build a `NoTls` pool for `url` (a URL or key/value DSN). Nothing connects
/// until the first checkout.
#[cfg(feature = "pool")]
fn connect_pool(url: &str, max_size: usize) -> OrmResult<deadpool_postgres::Pool> {
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};

    let pg_config: tokio_postgres::Config = url
        .parse()
        .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;
    let manager = Manager::from_config(
        pg_config,
        tokio_postgres::NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| OrmError::Pool(e.to_string()))
}

impl<C: Connection> Storm<C> {
    /// Wrap an existing connection with default configuration.
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, StormConfig::default())
    }

    pub fn with_config(conn: C, config: StormConfig) -> Self {
        Self { conn, config }
    }

    /// The underlying connection, for raw SQL.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    /// Insert `record`, leaving its primary key to the database.
    pub async fn insert<T: Record>(&self, record: &T) -> OrmResult<u64> {
        let stmt = statement::insert(record)?;
        self.exec(Op::Insert, T::schema().table(), &stmt).await
    }

    /// Update the non-zero fields of `record`, matched by primary key.
    pub async fn update<T: Record>(&self, record: &T) -> OrmResult<u64> {
        let stmt = statement::update(record)?;
        self.exec(Op::Update, T::schema().table(), &stmt).await
    }

    /// Update the named columns of `record`, whatever their values.
    pub async fn update_columns<T: Record>(&self, record: &T, columns: &[&str]) -> OrmResult<u64> {
        let stmt = statement::update_columns(record, columns)?;
        self.exec(Op::Update, T::schema().table(), &stmt).await
    }

    /// Delete `record` by primary key.
    pub async fn delete<T: Record>(&self, record: &T) -> OrmResult<u64> {
        let stmt = statement::delete(record)?;
        self.exec(Op::Delete, T::schema().table(), &stmt).await
    }

    /// Start a query against `T`'s table.
    pub fn from<T: Record>(&self) -> Query<'_, C, T> {
        Query::new(self)
    }

    pub(crate) async fn exec(&self, op: Op, table: &str, stmt: &Statement) -> OrmResult<u64> {
        trace::statement(&self.config, op, table, stmt);
        self.conn.execute(&stmt.sql, &stmt.args).await
    }

    pub(crate) async fn fetch(&self, op: Op, table: &str, stmt: &Statement) -> OrmResult<RowSet> {
        trace::statement(&self.config, op, table, stmt);
        self.conn.query_rows(&stmt.sql, &stmt.args).await
    }

    pub(crate) async fn scalar(&self, op: Op, table: &str, stmt: &Statement) -> OrmResult<DbValue> {
        trace::statement(&self.config, op, table, stmt);
        self.conn.query_scalar(&stmt.sql, &stmt.args).await
    }
}
