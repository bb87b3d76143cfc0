//! Type coercion from [`DbValue`] into typed record fields.
//!
//! Coercion is a pure function over the closed [`DbValue`] variant set and the
//! target's [`FieldKind`]:
//!
//! 1. `Null` leaves the target untouched.
//! 2. A source whose variant is the target's native representation is assigned directly.
//! 3. Otherwise the target kind decides:
//!    - signed integers accept integer sources and floats (truncated toward zero);
//!    - unsigned integers accept the same set, but reject negative sources;
//!    - floats accept float and integer sources;
//!    - text accepts text and UTF-8 bytes;
//!    - bool accepts bool and `int64` (non-zero is `true`);
//!    - every other kind fails with [`CoerceError::Unsupported`].
//!
//! Narrowing into a smaller integer never wraps: out-of-range values fail with
//! [`CoerceError::OutOfRange`].

use crate::value::DbValue;
use thiserror::Error;

/// Errors produced while coercing a [`DbValue`] into a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("cannot convert {from} to {to}")]
    CannotConvert {
        from: &'static str,
        to: &'static str,
    },

    #[error("value {value} is out of range for {to}")]
    OutOfRange { value: String, to: &'static str },

    #[error("negative value {value} cannot be stored in unsigned {to}")]
    Negative { value: String, to: &'static str },

    #[error("bytes are not valid UTF-8 text for {to}")]
    InvalidText { to: &'static str },

    #[error("unsupported field type: {to}")]
    Unsupported { to: &'static str },
}

/// Static description of a field's target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Text,
    Bool,
    Bytes,
    /// A type storm cannot populate from the database.
    Other(&'static str),
}

impl FieldKind {
    /// Rust type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::Text => "String",
            FieldKind::Bool => "bool",
            FieldKind::Bytes => "Vec<u8>",
            FieldKind::Other(name) => name,
        }
    }

    fn int_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            FieldKind::I8 => (i8::MIN as i128, i8::MAX as i128),
            FieldKind::I16 => (i16::MIN as i128, i16::MAX as i128),
            FieldKind::I32 => (i32::MIN as i128, i32::MAX as i128),
            FieldKind::I64 => (i64::MIN as i128, i64::MAX as i128),
            FieldKind::U8 => (0, u8::MAX as i128),
            FieldKind::U16 => (0, u16::MAX as i128),
            FieldKind::U32 => (0, u32::MAX as i128),
            FieldKind::U64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(bounds)
    }

    fn is_unsigned(self) -> bool {
        matches!(
            self,
            FieldKind::U8 | FieldKind::U16 | FieldKind::U32 | FieldKind::U64
        )
    }

    /// Whether `value` is this kind's native representation (direct assignment).
    fn is_native(self, value: &DbValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::I16, DbValue::Int16(_))
                | (FieldKind::I32, DbValue::Int32(_))
                | (FieldKind::I64, DbValue::Int64(_))
                | (FieldKind::F32, DbValue::Float32(_))
                | (FieldKind::F64, DbValue::Float64(_))
                | (FieldKind::Text, DbValue::Text(_))
                | (FieldKind::Bool, DbValue::Bool(_))
                | (FieldKind::Bytes, DbValue::Bytes(_))
        )
    }
}

/// A value already normalized for its target kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

fn direct(value: DbValue) -> Option<Coerced> {
    match value {
        DbValue::Null => None,
        DbValue::Bool(v) => Some(Coerced::Bool(v)),
        DbValue::Int16(v) => Some(Coerced::Signed(i64::from(v))),
        DbValue::Int32(v) => Some(Coerced::Signed(i64::from(v))),
        DbValue::Int64(v) => Some(Coerced::Signed(v)),
        DbValue::Float32(v) => Some(Coerced::Float(f64::from(v))),
        DbValue::Float64(v) => Some(Coerced::Float(v)),
        DbValue::Text(v) => Some(Coerced::Text(v)),
        DbValue::Bytes(v) => Some(Coerced::Bytes(v)),
    }
}

fn to_integer(kind: FieldKind, value: &DbValue) -> Result<Coerced, CoerceError> {
    let to = kind.name();
    let (min, max) = kind.int_bounds().ok_or(CoerceError::Unsupported { to })?;

    let wide: i128 = if let Some(v) = value.as_i64() {
        i128::from(v)
    } else if let Some(v) = value.as_f64() {
        let truncated = v.trunc();
        if !truncated.is_finite() || truncated < min as f64 || truncated > max as f64 {
            return Err(range_error(kind, v.to_string()));
        }
        truncated as i128
    } else {
        return Err(CoerceError::CannotConvert {
            from: value.type_name(),
            to,
        });
    };

    if wide < min || wide > max {
        return Err(range_error(kind, wide.to_string()));
    }
    if kind.is_unsigned() {
        Ok(Coerced::Unsigned(wide as u64))
    } else {
        Ok(Coerced::Signed(wide as i64))
    }
}

fn range_error(kind: FieldKind, value: String) -> CoerceError {
    if kind.is_unsigned() && value.starts_with('-') {
        CoerceError::Negative {
            value,
            to: kind.name(),
        }
    } else {
        CoerceError::OutOfRange {
            value,
            to: kind.name(),
        }
    }
}

/// Coerce `value` for a target of `kind`.
///
/// Returns `Ok(None)` for `Null`, meaning "leave the field as it is".
pub fn coerce(kind: FieldKind, value: DbValue) -> Result<Option<Coerced>, CoerceError> {
    if value.is_null() {
        return Ok(None);
    }
    if kind.is_native(&value) {
        return Ok(direct(value));
    }

    let to = kind.name();
    let coerced = match kind {
        FieldKind::I8
        | FieldKind::I16
        | FieldKind::I32
        | FieldKind::I64
        | FieldKind::U8
        | FieldKind::U16
        | FieldKind::U32
        | FieldKind::U64 => to_integer(kind, &value)?,
        FieldKind::F32 | FieldKind::F64 => match (value.as_i64(), value.as_f64()) {
            (Some(i), _) => Coerced::Float(i as f64),
            (_, Some(f)) => Coerced::Float(f),
            _ => {
                return Err(CoerceError::CannotConvert {
                    from: value.type_name(),
                    to,
                });
            }
        },
        FieldKind::Text => match value {
            DbValue::Bytes(bytes) => String::from_utf8(bytes)
                .map(Coerced::Text)
                .map_err(|_| CoerceError::InvalidText { to })?,
            other => {
                return Err(CoerceError::CannotConvert {
                    from: other.type_name(),
                    to,
                });
            }
        },
        FieldKind::Bool => match value {
            DbValue::Int64(v) => Coerced::Bool(v != 0),
            other => {
                return Err(CoerceError::CannotConvert {
                    from: other.type_name(),
                    to,
                });
            }
        },
        FieldKind::Bytes | FieldKind::Other(_) => return Err(CoerceError::Unsupported { to }),
    };
    Ok(Some(coerced))
}

/// A Rust type that can live in a record field.
pub trait FieldType: Sized {
    /// Target kind driving [`coerce`].
    const KIND: FieldKind;

    /// Build the value from an already-coerced representation.
    fn from_coerced(value: Coerced) -> Option<Self>;

    /// Encode the field as a statement argument.
    ///
    /// Fails when the value has no lossless representation in the bound column type.
    fn to_db_value(&self) -> Result<DbValue, CoerceError>;

    /// Whether the field holds its type's zero value.
    fn is_zero(&self) -> bool;
}

/// Coerce `value` and store it in `slot`.
///
/// `Null` leaves `slot` unchanged.
pub fn assign<T: FieldType>(slot: &mut T, value: DbValue) -> Result<(), CoerceError> {
    let from = value.type_name();
    if let Some(coerced) = coerce(T::KIND, value)? {
        *slot = T::from_coerced(coerced).ok_or(CoerceError::CannotConvert {
            from,
            to: T::KIND.name(),
        })?;
    }
    Ok(())
}

macro_rules! signed_field {
    ($($ty:ty => $kind:ident, $variant:ident);* $(;)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn from_coerced(value: Coerced) -> Option<Self> {
                    match value {
                        Coerced::Signed(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }

                fn to_db_value(&self) -> Result<DbValue, CoerceError> {
                    Ok(DbValue::$variant((*self).into()))
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

signed_field! {
    i8 => I8, Int16;
    i16 => I16, Int16;
    i32 => I32, Int32;
    i64 => I64, Int64;
}

macro_rules! unsigned_field {
    ($($ty:ty => $kind:ident, $encode:expr);* $(;)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn from_coerced(value: Coerced) -> Option<Self> {
                    match value {
                        Coerced::Unsigned(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }

                fn to_db_value(&self) -> Result<DbValue, CoerceError> {
                    let encode: fn($ty) -> Result<DbValue, CoerceError> = $encode;
                    encode(*self)
                }

                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

// PostgreSQL has no unsigned integers: values are stored in the next wider
// signed column. u64 is bound as int8, so values above i64::MAX are rejected.
unsigned_field! {
    u8 => U8, |v| Ok(DbValue::Int16(i16::from(v)));
    u16 => U16, |v| Ok(DbValue::Int32(i32::from(v)));
    u32 => U32, |v| Ok(DbValue::Int64(i64::from(v)));
    u64 => U64, |v| {
        i64::try_from(v)
            .map(DbValue::Int64)
            .map_err(|_| CoerceError::OutOfRange {
                value: v.to_string(),
                to: "int8",
            })
    };
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::F32;

    fn from_coerced(value: Coerced) -> Option<Self> {
        match value {
            Coerced::Float(v) => Some(v as f32),
            _ => None,
        }
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        Ok(DbValue::Float32(*self))
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::F64;

    fn from_coerced(value: Coerced) -> Option<Self> {
        match value {
            Coerced::Float(v) => Some(v),
            _ => None,
        }
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        Ok(DbValue::Float64(*self))
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_coerced(value: Coerced) -> Option<Self> {
        match value {
            Coerced::Text(v) => Some(v),
            _ => None,
        }
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        Ok(DbValue::Text(self.clone()))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_coerced(value: Coerced) -> Option<Self> {
        match value {
            Coerced::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        Ok(DbValue::Bool(*self))
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl FieldType for Vec<u8> {
    const KIND: FieldKind = FieldKind::Bytes;

    fn from_coerced(value: Coerced) -> Option<Self> {
        match value {
            Coerced::Bytes(v) => Some(v),
            _ => None,
        }
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        Ok(DbValue::Bytes(self.clone()))
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

// `None` is the zero value and encodes as NULL. A NULL source still leaves the
// field untouched, like every other kind.
impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_coerced(value: Coerced) -> Option<Self> {
        T::from_coerced(value).map(Some)
    }

    fn to_db_value(&self) -> Result<DbValue, CoerceError> {
        self.as_ref().map_or(Ok(DbValue::Null), FieldType::to_db_value)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}
