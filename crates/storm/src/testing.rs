//! An in-memory [`Connection`] for tests.
//!
//! `MemoryConnection` records every statement it receives and answers from a
//! FIFO queue of scripted responses. When the queue is empty, `execute`
//! reports one affected row and queries return an empty [`RowSet`].
//!
//! ```ignore
//! let conn = MemoryConnection::new();
//! conn.push_rows(RowSet::new(["id"]).row([DbValue::Int64(1)]));
//! let db = Storm::new(conn);
//! let users = db.from::<User>().select(&[]).await?;
//! assert_eq!(db.connection().executed()[0].sql, "SELECT * FROM users");
//! ```

use crate::client::{Connection, RowSet};
use crate::error::{OrmError, OrmResult};
use crate::statement::Statement;
use crate::value::DbValue;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Response {
    Rows(RowSet),
    Affected(u64),
    Error(String),
}

/// Scripted, recording connection.
#[derive(Debug, Default)]
pub struct MemoryConnection {
    executed: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Response>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next query with `rows`.
    pub fn push_rows(&self, rows: RowSet) {
        lock(&self.responses).push_back(Response::Rows(rows));
    }

    /// Answer the next query with a single-value result.
    pub fn push_scalar(&self, value: DbValue) {
        self.push_rows(RowSet::new(["?column?"]).row([value]));
    }

    /// Answer the next statement with an affected-row count.
    pub fn push_affected(&self, n: u64) {
        lock(&self.responses).push_back(Response::Affected(n));
    }

    /// Fail the next call with `message`.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.responses).push_back(Response::Error(message.into()));
    }

    /// Statements received so far, in order.
    pub fn executed(&self) -> Vec<Statement> {
        lock(&self.executed).clone()
    }

    pub fn clear(&self) {
        lock(&self.executed).clear();
        lock(&self.responses).clear();
    }

    fn record(&self, sql: &str, args: &[DbValue]) -> Option<Response> {
        lock(&self.executed).push(Statement {
            sql: sql.to_string(),
            args: args.to_vec(),
        });
        lock(&self.responses).pop_front()
    }
}

impl Connection for MemoryConnection {
    async fn execute(&self, sql: &str, args: &[DbValue]) -> OrmResult<u64> {
        match self.record(sql, args) {
            None => Ok(1),
            Some(Response::Affected(n)) => Ok(n),
            Some(Response::Rows(rows)) => Ok(rows.len() as u64),
            Some(Response::Error(message)) => Err(OrmError::Other(message)),
        }
    }

    async fn query_rows(&self, sql: &str, args: &[DbValue]) -> OrmResult<RowSet> {
        match self.record(sql, args) {
            None | Some(Response::Affected(_)) => Ok(RowSet::default()),
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Error(message)) => Err(OrmError::Other(message)),
        }
    }
}
