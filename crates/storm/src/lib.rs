//! # storm
//!
//! A small struct-to-row mapping layer for PostgreSQL.
//!
//! ## Features
//!
//! - **Declared mapping**: `#[derive(Record)]` builds a schema descriptor once per type
//! - **Plain SQL**: statements use `$n` placeholders and are logged on `storm.sql`
//! - **Predictable coercion**: driver values are converted by a fixed, documented matrix
//! - **Testable**: any [`Connection`] works, including the in-memory [`testing::MemoryConnection`]
//!
//! ## Example
//!
//! ```ignore
//! use storm::{Record, Storm};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[storm(pk)]
//!     id: i64,
//!     #[storm(column = "name_user")]
//!     name: String,
//!     #[storm(column = "email_user")]
//!     email: String,
//! }
//!
//! let db = Storm::open("postgres", "postgres://localhost/app").await?;
//!
//! db.insert(&User { name: "dikha".into(), email: "dikha@gmail.com".into(), ..Default::default() })
//!     .await?;
//!
//! let page = db.from::<User>().paginate(1, 10, &[]).await?;
//!
//! let mut user = User::default();
//! let found = db
//!     .from::<User>()
//!     .filter("name_user = $1")
//!     .bind("dikha")
//!     .first(&mut user, &[])
//!     .await?;
//! ```

pub mod client;
pub mod coerce;
pub mod config;
pub mod db;
pub mod error;
pub mod mapper;
pub mod query;
pub mod schema;
pub mod statement;
pub mod tag;
pub mod testing;
pub mod value;

mod trace;

#[cfg(test)]
mod fixtures;

pub use client::{Connection, RowSet};
pub use coerce::{CoerceError, FieldKind, FieldType};
pub use config::StormConfig;
pub use db::Storm;
pub use error::{OrmError, OrmResult};
pub use query::{Page, Query};
pub use schema::{FieldDef, Record, RecordSchema};
pub use statement::Statement;
pub use value::DbValue;

#[cfg(feature = "derive")]
pub use storm_derive::Record;
