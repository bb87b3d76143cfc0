//! Query facade: filter, limit and paginate reads of one record type.
//!
//! ```ignore
//! let page = db
//!     .from::<User>()
//!     .filter("name_user LIKE $1")
//!     .bind("d%")
//!     .paginate(1, 20, &[])
//!     .await?;
//! ```
//!
//! Every configuration call returns a new `Query`; terminals borrow it, so
//! the same query can be executed any number of times.

use crate::client::Connection;
use crate::coerce;
use crate::db::Storm;
use crate::error::{OrmError, OrmResult};
use crate::mapper;
use crate::schema::Record;
use crate::statement::{self, Filter, Select, Statement};
use crate::trace::Op;
use crate::value::DbValue;
use serde::Serialize;
use std::marker::PhantomData;

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows in the whole table.
    pub total: i64,
    pub total_pages: i64,
    /// Requested page after clamping (1-based).
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<T>,
}

/// Accumulated read state for record type `T`.
pub struct Query<'a, C, T> {
    db: &'a Storm<C>,
    table: &'a str,
    clause: Option<String>,
    args: Vec<DbValue>,
    limit: Option<i64>,
    _record: PhantomData<fn() -> T>,
}

impl<C, T> Clone for Query<'_, C, T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db,
            table: self.table,
            clause: self.clause.clone(),
            args: self.args.clone(),
            limit: self.limit,
            _record: PhantomData,
        }
    }
}

impl<C, T> std::fmt::Debug for Query<'_, C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.table)
            .field("clause", &self.clause)
            .field("args", &self.args)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<'a, C: Connection, T: Record> Query<'a, C, T> {
    pub(crate) fn new(db: &'a Storm<C>) -> Self {
        Self {
            db,
            table: T::schema().table(),
            clause: None,
            args: Vec::new(),
            limit: None,
            _record: PhantomData,
        }
    }

    /// Set the WHERE clause. Placeholders are written by the caller (`$1`, ...)
    /// and the clause is used verbatim.
    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.clause = Some(clause.into());
        self
    }

    /// Append a positional argument for the WHERE clause.
    pub fn bind(mut self, value: impl Into<DbValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Limit `select` to `n` rows. `n <= 0` means no limit.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    fn filter_clause(&self) -> OrmResult<Option<Filter>> {
        match &self.clause {
            Some(clause) => Ok(Some(Filter {
                clause: clause.clone(),
                args: self.args.clone(),
            })),
            None if self.args.is_empty() => Ok(None),
            None => Err(OrmError::validation(format!(
                "{} argument(s) bound without a filter clause",
                self.args.len()
            ))),
        }
    }

    fn base_select(&self, columns: &[&str]) -> OrmResult<Select> {
        Ok(Select::new(self.table)
            .columns(columns)
            .filter(self.filter_clause()?))
    }

    /// The statement `select` would run.
    pub fn to_select_sql(&self, columns: &[&str]) -> OrmResult<Statement> {
        Ok(self.base_select(columns)?.limit(self.limit).build())
    }

    /// Fetch all matching rows. Empty `columns` selects `*`.
    pub async fn select(&self, columns: &[&str]) -> OrmResult<Vec<T>> {
        let stmt = self.to_select_sql(columns)?;
        let rows = self.db.fetch(Op::Select, self.table, &stmt).await?;
        mapper::map_rows(rows)
    }

    /// Fetch one row into `dest`.
    ///
    /// Returns `Ok(false)` and leaves `dest` untouched when nothing matches.
    pub async fn first(&self, dest: &mut T, columns: &[&str]) -> OrmResult<bool> {
        let stmt = self.base_select(columns)?.limit(Some(1)).build();
        let rows = self.db.fetch(Op::Select, self.table, &stmt).await?;

        let columns = rows.columns;
        match rows.rows.into_iter().next() {
            Some(values) => {
                mapper::map_row(dest, &columns, values)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch one page ordered by the primary key.
    ///
    /// `page` and `page_size` are clamped to at least 1. The total is counted
    /// over the whole table; the filter narrows only the returned items.
    pub async fn paginate(&self, page: i64, page_size: i64, columns: &[&str]) -> OrmResult<Page<T>> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let count = statement::count(self.table);
        let scalar = self.db.scalar(Op::Count, self.table, &count).await?;
        let mut total = 0i64;
        coerce::assign(&mut total, scalar).map_err(|e| OrmError::decode("count", e))?;

        let stmt = self
            .base_select(columns)?
            .order_by(order_column::<T>())
            .page(page, page_size)
            .build();
        let rows = self.db.fetch(Op::Select, self.table, &stmt).await?;

        Ok(Page {
            total,
            total_pages: statement::total_pages(total, page_size),
            page,
            page_size,
            items: mapper::map_rows(rows)?,
        })
    }
}

/// The column pages are ordered by: the primary key, or `id` without one.
fn order_column<T: Record>() -> &'static str {
    let schema = T::schema();
    match schema.primary_key() {
        Ok(pk) => pk.column(),
        Err(e) => {
            tracing::debug!(
                target: "storm",
                record = schema.record_name(),
                error = %e,
                "ordering pages by `id`"
            );
            "id"
        }
    }
}
