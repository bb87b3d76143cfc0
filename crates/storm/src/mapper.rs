//! Row mapping: populate records from result-set rows.

use crate::client::RowSet;
use crate::error::{OrmError, OrmResult};
use crate::schema::{FieldDef, Record, RecordSchema};
use crate::value::DbValue;
use std::collections::HashMap;

/// Lower-cased column name -> field name for a record type.
///
/// Built fresh for every mapping call.
pub fn column_map<T>(schema: &RecordSchema<T>) -> HashMap<String, &'static str> {
    schema
        .fields()
        .iter()
        .map(|f| (f.column().to_lowercase(), f.name()))
        .collect()
}

fn resolve_fields<'s, T>(
    schema: &'s RecordSchema<T>,
    columns: &[String],
) -> Vec<Option<&'s FieldDef<T>>> {
    let mapping = column_map(schema);
    columns
        .iter()
        .map(|column| {
            mapping
                .get(&column.to_lowercase())
                .and_then(|name| schema.field_by_name(name))
        })
        .collect()
}

fn apply<T>(
    dest: &mut T,
    fields: &[Option<&FieldDef<T>>],
    columns: &[String],
    values: Vec<DbValue>,
) -> OrmResult<()> {
    for ((field, column), value) in fields.iter().zip(columns).zip(values) {
        let Some(field) = field else {
            continue;
        };
        field.set(dest, value).map_err(|source| {
            tracing::debug!(
                target: "storm",
                column = %column,
                field = field.name(),
                error = %source,
                "row decode failed"
            );
            OrmError::decode(column.clone(), source)
        })?;
    }
    Ok(())
}

/// Populate `dest` from one row.
///
/// Columns with no matching field are skipped. The first coercion failure
/// aborts the row; fields set before it keep their new values.
pub fn map_row<T: Record>(dest: &mut T, columns: &[String], values: Vec<DbValue>) -> OrmResult<()> {
    let fields = resolve_fields(T::schema(), columns);
    apply(dest, &fields, columns, values)
}

/// Build one record per row, starting each from `T::default()`.
pub fn map_rows<T: Record>(rows: RowSet) -> OrmResult<Vec<T>> {
    let RowSet { columns, rows } = rows;
    let fields = resolve_fields(T::schema(), &columns);

    rows.into_iter()
        .map(|values| {
            let mut record = T::default();
            apply(&mut record, &fields, &columns, values)?;
            Ok(record)
        })
        .collect()
}
