//! Database values exchanged with the driver.
//!
//! [`DbValue`] is the closed set of scalar shapes storm understands. The driver
//! adapter decodes every column into one of these variants, and statement
//! arguments are encoded from them.

use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

/// A loosely-typed value read from (or bound to) a SQL statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DbValue {
    #[default]
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl DbValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DbValue::Null => "null",
            DbValue::Bool(_) => "bool",
            DbValue::Int16(_) => "int16",
            DbValue::Int32(_) => "int32",
            DbValue::Int64(_) => "int64",
            DbValue::Float32(_) => "float32",
            DbValue::Float64(_) => "float64",
            DbValue::Text(_) => "text",
            DbValue::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    /// Widen any integer variant to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DbValue::Int16(v) => Some(i64::from(*v)),
            DbValue::Int32(v) => Some(i64::from(*v)),
            DbValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen any float variant to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DbValue::Float32(v) => Some(f64::from(*v)),
            DbValue::Float64(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DbValue {
                fn from(v: $ty) -> Self {
                    DbValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int16,
    i16 => Int16,
    u8 => Int16,
    i32 => Int32,
    u16 => Int32,
    i64 => Int64,
    u32 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DbValue::Null, Into::into)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        Type::BOOL => (v != 0).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(v.trunc() as i64, ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => v.to_string().to_sql(ty, out),
        _ => v.to_sql(ty, out),
    }
}

// Text arguments bound to typed columns are parsed with the same renderings the
// driver adapter produces when decoding them.
fn text_to_sql(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::UUID => uuid::Uuid::parse_str(v)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(v)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => chrono::DateTime::parse_from_rfc3339(v)?
            .with_timezone(&chrono::Utc)
            .to_sql(ty, out),
        Type::TIMESTAMP => {
            chrono::NaiveDateTime::parse_from_str(v, crate::client::NAIVE_DATETIME_FORMAT)?
                .to_sql(ty, out)
        }
        Type::DATE => v.parse::<chrono::NaiveDate>()?.to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 => int_to_sql(v.trim().parse()?, ty, out),
        Type::FLOAT4 | Type::FLOAT8 => float_to_sql(v.trim().parse()?, ty, out),
        _ => v.to_sql(ty, out),
    }
}

impl ToSql for DbValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            DbValue::Null => Ok(IsNull::Yes),
            DbValue::Bool(v) => v.to_sql(ty, out),
            DbValue::Int16(v) => int_to_sql(i64::from(*v), ty, out),
            DbValue::Int32(v) => int_to_sql(i64::from(*v), ty, out),
            DbValue::Int64(v) => int_to_sql(*v, ty, out),
            DbValue::Float32(v) => float_to_sql(f64::from(*v), ty, out),
            DbValue::Float64(v) => float_to_sql(*v, ty, out),
            DbValue::Text(v) => text_to_sql(v, ty, out),
            DbValue::Bytes(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        is_numeric(ty)
            || *ty == Type::BOOL
            || text_accepts(ty)
            || <Vec<u8> as ToSql>::accepts(ty)
    }

    fn to_sql_checked(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        if !self.binds_to(ty) {
            return Err(Box::new(WrongType::new::<DbValue>(ty.clone())));
        }
        self.to_sql(ty, out)
    }
}

fn is_numeric(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::INT2 | Type::INT4 | Type::INT8 | Type::FLOAT4 | Type::FLOAT8
    )
}

fn is_plain_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR)
}

fn text_accepts(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::UUID | Type::JSON | Type::JSONB | Type::TIMESTAMPTZ | Type::TIMESTAMP | Type::DATE
    ) || is_numeric(ty)
        || <&str as ToSql>::accepts(ty)
}

impl DbValue {
    /// Whether this value has an encoding for a parameter of type `ty`.
    fn binds_to(&self, ty: &Type) -> bool {
        match self {
            DbValue::Null => true,
            DbValue::Bool(_) => *ty == Type::BOOL,
            DbValue::Int16(_) | DbValue::Int32(_) | DbValue::Int64(_) => {
                is_numeric(ty) || *ty == Type::BOOL || is_plain_text(ty)
            }
            DbValue::Float32(_) | DbValue::Float64(_) => is_numeric(ty) || is_plain_text(ty),
            DbValue::Text(_) => text_accepts(ty),
            DbValue::Bytes(_) => <Vec<u8> as ToSql>::accepts(ty),
        }
    }
}
