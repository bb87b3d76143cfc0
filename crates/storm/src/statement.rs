//! SQL statement construction.
//!
//! Every builder returns a [`Statement`]: PostgreSQL SQL text with `$n`
//! placeholders plus the arguments in placeholder order. Placeholders are
//! numbered contiguously from `$1` in the order arguments are appended.

use crate::error::{OrmError, OrmResult};
use crate::schema::{FieldDef, Record};
use crate::value::DbValue;
use std::fmt::Write as _;

/// Parameterized SQL text plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<DbValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument and return its placeholder (`$n`).
    fn bind(&mut self, value: DbValue) -> String {
        self.args.push(value);
        format!("${}", self.args.len())
    }
}

/// Read `field` from `record` as an argument, naming the column on failure.
fn field_arg<T>(field: &FieldDef<T>, record: &T) -> OrmResult<DbValue> {
    field
        .value(record)
        .map_err(|e| OrmError::encode(field.column(), e))
}

/// `INSERT INTO <table> (<cols>) VALUES ($1, ...)` for every non-key field.
///
/// The primary key is left for the database to assign. A record with no
/// non-key fields inserts `DEFAULT VALUES`.
pub fn insert<T: Record>(record: &T) -> OrmResult<Statement> {
    let schema = T::schema();
    schema.primary_key()?;

    let mut stmt = Statement::default();
    let mut columns = Vec::with_capacity(schema.fields().len());
    let mut placeholders = Vec::with_capacity(schema.fields().len());

    for field in schema.fields().iter().filter(|f| !f.is_primary_key()) {
        columns.push(field.column());
        placeholders.push(stmt.bind(field_arg(field, record)?));
    }

    stmt.sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", schema.table())
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table(),
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    Ok(stmt)
}

/// `UPDATE <table> SET ... WHERE <pk> = $n` for every non-key field holding a
/// non-zero value.
///
/// Zero-valued fields are omitted from the SET list. A record whose non-key
/// fields are all zero is rejected, since there is nothing to set.
pub fn update<T: Record>(record: &T) -> OrmResult<Statement> {
    let schema = T::schema();
    let pk = schema.primary_key()?;

    let mut stmt = Statement::default();
    let mut sets = Vec::new();
    for field in schema.fields().iter().filter(|f| !f.is_primary_key()) {
        if field.is_zero(record) {
            continue;
        }
        let placeholder = stmt.bind(field_arg(field, record)?);
        sets.push(format!("{} = {}", field.column(), placeholder));
    }

    if sets.is_empty() {
        return Err(OrmError::validation(format!(
            "update of `{}` has no non-zero fields to set",
            schema.record_name()
        )));
    }

    let pk_placeholder = stmt.bind(field_arg(pk, record)?);
    stmt.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        schema.table(),
        sets.join(", "),
        pk.column(),
        pk_placeholder
    );
    Ok(stmt)
}

/// `UPDATE` restricted to the named columns, regardless of their values.
///
/// Columns are matched case-insensitively against the record's column names.
pub fn update_columns<T: Record>(record: &T, columns: &[&str]) -> OrmResult<Statement> {
    let schema = T::schema();
    let pk = schema.primary_key()?;

    if columns.is_empty() {
        return Err(OrmError::validation("update_columns requires at least one column"));
    }

    let mut stmt = Statement::default();
    let mut sets = Vec::with_capacity(columns.len());
    for wanted in columns {
        let field = schema
            .fields()
            .iter()
            .find(|f| f.column().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                OrmError::validation(format!(
                    "`{}` has no column named `{}`",
                    schema.record_name(),
                    wanted
                ))
            })?;
        if field.is_primary_key() {
            return Err(OrmError::validation(format!(
                "primary key column `{}` cannot be updated",
                field.column()
            )));
        }
        let placeholder = stmt.bind(field_arg(field, record)?);
        sets.push(format!("{} = {}", field.column(), placeholder));
    }

    let pk_placeholder = stmt.bind(field_arg(pk, record)?);
    stmt.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        schema.table(),
        sets.join(", "),
        pk.column(),
        pk_placeholder
    );
    Ok(stmt)
}

/// `DELETE FROM <table> WHERE <pk> = $1`.
pub fn delete<T: Record>(record: &T) -> OrmResult<Statement> {
    let schema = T::schema();
    let pk = schema.primary_key()?;

    let mut stmt = Statement::default();
    let placeholder = stmt.bind(field_arg(pk, record)?);
    stmt.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        schema.table(),
        pk.column(),
        placeholder
    );
    Ok(stmt)
}

/// `SELECT COUNT(*) FROM <table>`.
pub fn count(table: &str) -> Statement {
    Statement::new(format!("SELECT COUNT(*) FROM {table}"))
}

/// A caller-written WHERE fragment and its positional arguments.
///
/// The fragment is appended verbatim; it is not escaped or rewritten.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub clause: String,
    pub args: Vec<DbValue>,
}

/// Clamp a 1-based page and page size to at least 1 and compute `(limit, offset)`.
pub fn page_window(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.max(1);
    let size = page_size.max(1);
    (size, (page - 1).saturating_mul(size))
}

/// Number of pages of `page_size` rows needed for `total` rows.
///
/// `page_size` is clamped to at least 1 like [`page_window`]; a non-positive
/// `total` has no pages.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total - 1) / page_size.max(1) + 1
    }
}

/// SELECT statement builder.
#[derive(Debug, Clone, Default)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    filter: Option<Filter>,
    order_by: Option<String>,
    limit: Option<i64>,
    window: Option<(i64, i64)>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Select these columns instead of `*`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// Literal `LIMIT n`; values `<= 0` mean no limit.
    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit.filter(|n| *n > 0);
        self
    }

    /// Bound `LIMIT $n OFFSET $m` for one page (see [`page_window`]).
    pub fn page(mut self, page: i64, page_size: i64) -> Self {
        self.window = Some(page_window(page, page_size));
        self
    }

    pub fn build(&self) -> Statement {
        let mut stmt = Statement::default();
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        stmt.sql = format!("SELECT {} FROM {}", columns, self.table);

        if let Some(filter) = &self.filter {
            stmt.sql.push_str(" WHERE ");
            stmt.sql.push_str(&filter.clause);
            stmt.args.extend(filter.args.iter().cloned());
        }

        if let Some(order) = &self.order_by {
            let _ = write!(stmt.sql, " ORDER BY {order}");
        }

        if let Some((limit, offset)) = self.window {
            let limit = stmt.bind(DbValue::Int64(limit));
            let offset = stmt.bind(DbValue::Int64(offset));
            let _ = write!(stmt.sql, " LIMIT {limit} OFFSET {offset}");
        } else if let Some(limit) = self.limit {
            let _ = write!(stmt.sql, " LIMIT {limit}");
        }

        stmt
    }
}
