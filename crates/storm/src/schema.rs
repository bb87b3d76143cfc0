//! Record schema descriptors.
//!
//! A [`RecordSchema`] is the ordered list of fields of a record type, each with
//! its resolved column, primary-key flag and accessors. It is built once per
//! type (normally by `#[derive(Record)]`) and shared by every statement and row
//! mapping for that type.

use crate::coerce::{self, CoerceError, FieldKind, FieldType};
use crate::error::{OrmError, OrmResult};
use crate::tag::{self, ColumnTag};
use crate::value::DbValue;
use std::fmt;

/// A struct that maps to one table row.
///
/// Usually derived:
///
/// ```ignore
/// use storm::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     #[storm(pk)]
///     id: i64,
///     #[storm(column = "name_user")]
///     name: String,
///     #[storm(column = "email_user")]
///     email: String,
/// }
/// ```
pub trait Record: Default + Send + Sync + 'static {
    fn schema() -> &'static RecordSchema<Self>;
}

type ReadFn<T> = Box<dyn Fn(&T) -> Result<DbValue, CoerceError> + Send + Sync>;
type WriteFn<T> = Box<dyn Fn(&mut T, DbValue) -> Result<(), CoerceError> + Send + Sync>;
type ZeroFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// One field of a record type.
pub struct FieldDef<T> {
    name: &'static str,
    column: String,
    primary_key: bool,
    kind: FieldKind,
    read: ReadFn<T>,
    write: WriteFn<T>,
    is_zero: ZeroFn<T>,
}

impl<T> FieldDef<T> {
    /// Rust field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read the field from `record` as a statement argument.
    pub fn value(&self, record: &T) -> Result<DbValue, CoerceError> {
        (self.read)(record)
    }

    /// Coerce `value` into the field on `record`.
    pub fn set(&self, record: &mut T, value: DbValue) -> Result<(), CoerceError> {
        (self.write)(record, value)
    }

    /// Whether the field currently holds its type's zero value.
    pub fn is_zero(&self, record: &T) -> bool {
        (self.is_zero)(record)
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("primary_key", &self.primary_key)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Ordered field descriptors plus the table a record type maps to.
#[derive(Debug)]
pub struct RecordSchema<T> {
    record: &'static str,
    table: String,
    fields: Vec<FieldDef<T>>,
}

/// Default table name: lower-cased type name with an `s` suffix (`User` -> `users`).
pub fn table_name_for(record: &str) -> String {
    format!("{}s", record.to_lowercase())
}

impl<T: 'static> RecordSchema<T> {
    /// Start describing the record type named `record`.
    pub fn builder(record: &'static str) -> RecordSchemaBuilder<T> {
        RecordSchemaBuilder {
            record,
            table: None,
            fields: Vec::new(),
        }
    }
}

impl<T> RecordSchema<T> {
    /// Rust type name of the record.
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The sole primary-key field.
    ///
    /// Fails when the record declares none or more than one.
    pub fn primary_key(&self) -> OrmResult<&FieldDef<T>> {
        let mut keys = self.fields.iter().filter(|f| f.primary_key);
        match (keys.next(), keys.count()) {
            (Some(pk), 0) => Ok(pk),
            (None, _) => Err(OrmError::MissingPrimaryKey {
                record: self.record,
            }),
            (Some(_), rest) => Err(OrmError::DuplicatePrimaryKey {
                record: self.record,
                count: rest + 1,
            }),
        }
    }
}

/// Builder for [`RecordSchema`].
pub struct RecordSchemaBuilder<T> {
    record: &'static str,
    table: Option<String>,
    fields: Vec<FieldDef<T>>,
}

impl<T: 'static> RecordSchemaBuilder<T> {
    /// Override the derived table name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Append a field.
    ///
    /// `tag` is the field's directive string (see [`crate::tag`]); `get` and
    /// `get_mut` project the field out of the record.
    pub fn field<V: FieldType + 'static>(
        mut self,
        name: &'static str,
        tag: Option<&str>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        let ColumnTag {
            column,
            primary_key,
        } = tag::resolve(name, tag);
        self.fields.push(FieldDef {
            name,
            column,
            primary_key,
            kind: V::KIND,
            read: Box::new(move |record: &T| get(record).to_db_value()),
            write: Box::new(move |record: &mut T, value: DbValue| {
                coerce::assign(get_mut(record), value)
            }),
            is_zero: Box::new(move |record: &T| get(record).is_zero()),
        });
        self
    }

    pub fn build(self) -> RecordSchema<T> {
        RecordSchema {
            table: self.table.unwrap_or_else(|| table_name_for(self.record)),
            record: self.record,
            fields: self.fields,
        }
    }
}
