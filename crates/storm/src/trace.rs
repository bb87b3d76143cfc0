//! SQL logging on the `storm.sql` tracing target.

use crate::config::StormConfig;
use crate::statement::Statement;
use std::borrow::Cow;

/// Statement kind recorded in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Insert,
    Update,
    Delete,
    Select,
    Count,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Insert => "insert",
            Op::Update => "update",
            Op::Delete => "delete",
            Op::Select => "select",
            Op::Count => "count",
        }
    }
}

/// The longest prefix of `sql` within `max` bytes that ends on a char boundary.
fn clip(sql: &str, max: usize) -> &str {
    let end = sql
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(sql.len()))
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    &sql[..end]
}

fn display_sql<'a>(config: &StormConfig, sql: &'a str) -> Cow<'a, str> {
    match config.max_logged_sql_len {
        Some(max) if sql.len() > max => Cow::Owned(format!("{}...", clip(sql, max))),
        _ => Cow::Borrowed(sql),
    }
}

/// Emit the statement about to be executed.
pub(crate) fn statement(config: &StormConfig, op: Op, table: &str, stmt: &Statement) {
    if !config.log_sql {
        return;
    }
    tracing::debug!(
        target: "storm.sql",
        op = op.as_str(),
        table,
        param_count = stmt.args.len(),
        sql = %display_sql(config, &stmt.sql),
    );
}
