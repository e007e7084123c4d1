//! Filter values and their coercion to bound parameters.
//!
//! Application code passes [`Value`]s (or sequences of them) to filter calls.
//! Before a value is bound it is coerced according to the target field, so
//! that e.g. timestamps reach the engine as unix seconds and booleans as 0/1.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{QueryError, QueryResult};
use crate::query::fragment::SqlParam;

use super::field::{AttrType, FieldDescriptor, FieldKind};

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Float.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// Text.
    Text(String),
    /// Point in time.
    Timestamp(DateTime<Utc>),
}

/// The right-hand side of a lookup: a single value or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupValue {
    /// A single value.
    Scalar(Value),
    /// An ordered sequence of values.
    Sequence(Vec<Value>),
}

impl LookupValue {
    /// Normalizes to a sequence; a scalar becomes a one-element sequence.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            LookupValue::Scalar(v) => vec![v],
            LookupValue::Sequence(vs) => vs,
        }
    }

    /// Returns the scalar, or `None` for a sequence.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            LookupValue::Scalar(v) => Some(v),
            LookupValue::Sequence(_) => None,
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for LookupValue {
                fn from(v: $ty) -> Self {
                    LookupValue::Scalar(Value::from(v))
                }
            }

            impl From<Vec<$ty>> for LookupValue {
                fn from(vs: Vec<$ty>) -> Self {
                    LookupValue::Sequence(vs.into_iter().map(Value::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for LookupValue {
                fn from(vs: [$ty; N]) -> Self {
                    LookupValue::Sequence(vs.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_value_from! {
    bool => |v| Value::Bool(v),
    i32 => |v| Value::Int(i64::from(v)),
    i64 => |v| Value::Int(v),
    u32 => |v| Value::UInt(u64::from(v)),
    u64 => |v| Value::UInt(v),
    f64 => |v| Value::Float(v),
    Decimal => |v| Value::Decimal(v),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_string()),
    DateTime<Utc> => |v| Value::Timestamp(v),
}

impl From<Value> for LookupValue {
    fn from(v: Value) -> Self {
        LookupValue::Scalar(v)
    }
}

impl From<Vec<Value>> for LookupValue {
    fn from(vs: Vec<Value>) -> Self {
        LookupValue::Sequence(vs)
    }
}

impl Value {
    /// Coerces this value into a bound parameter for `field`.
    ///
    /// Multi-value attributes coerce element-wise into the unsigned range of
    /// their width; every other kind follows the field's [`AttrType`].
    pub fn prep_for(&self, field: &FieldDescriptor) -> QueryResult<SqlParam> {
        if let Value::Null = self {
            return Ok(SqlParam::Null);
        }
        match field.kind {
            FieldKind::Multi32 => {
                let n = self.to_integer(field)?;
                if n < 0 || n > i128::from(u32::MAX) {
                    return Err(invalid(field, format!("{} is out of range for a 32-bit set", n)));
                }
                integer_param(field, n)
            }
            FieldKind::Multi64 | FieldKind::PrimaryKey => {
                let n = self.to_integer(field)?;
                if n < 0 {
                    return Err(invalid(field, format!("{} must not be negative", n)));
                }
                integer_param(field, n)
            }
            FieldKind::Scalar | FieldKind::FullText => self.prep_attribute(field),
        }
    }

    fn prep_attribute(&self, field: &FieldDescriptor) -> QueryResult<SqlParam> {
        match field.attr_type {
            AttrType::Integer | AttrType::BigInt => integer_param(field, self.to_integer(field)?),
            AttrType::Float => self.to_float(field).map(SqlParam::Float),
            AttrType::Bool => self.to_bool(field).map(|b| SqlParam::Integer(i64::from(b))),
            AttrType::String => Ok(SqlParam::String(self.to_text())),
            AttrType::Timestamp => self.to_unix_seconds(field).map(SqlParam::Integer),
        }
    }

    /// Integer view of the value. Widened to i128 so u64 and i64 both fit.
    fn to_integer(&self, field: &FieldDescriptor) -> QueryResult<i128> {
        match self {
            Value::Bool(b) => Ok(i128::from(*b)),
            Value::Int(i) => Ok(i128::from(*i)),
            Value::UInt(u) => Ok(i128::from(*u)),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i128),
            Value::Decimal(d) if d.fract().is_zero() => d
                .to_i128()
                .ok_or_else(|| invalid(field, format!("{} does not fit an integer", d))),
            Value::Text(s) => s
                .trim()
                .parse::<i128>()
                .map_err(|_| invalid(field, format!("'{}' is not an integer", s))),
            other => Err(invalid(field, format!("{:?} is not an integer", other))),
        }
    }

    fn to_float(&self, field: &FieldDescriptor) -> QueryResult<f64> {
        match self {
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Ok(*i as f64),
            Value::UInt(u) => Ok(*u as f64),
            Value::Float(f) => Ok(*f),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| invalid(field, format!("{} does not fit a float", d))),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(field, format!("'{}' is not a number", s))),
            other => Err(invalid(field, format!("{:?} is not a number", other))),
        }
    }

    fn to_bool(&self, field: &FieldDescriptor) -> QueryResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) | Value::UInt(0) => Ok(false),
            Value::Int(1) | Value::UInt(1) => Ok(true),
            Value::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(invalid(field, format!("'{}' is not a boolean", s))),
            },
            other => Err(invalid(field, format!("{:?} is not a boolean", other))),
        }
    }

    fn to_unix_seconds(&self, field: &FieldDescriptor) -> QueryResult<i64> {
        match self {
            Value::Timestamp(ts) => Ok(ts.timestamp()),
            Value::Int(i) => Ok(*i),
            Value::UInt(u) => i64::try_from(*u)
                .map_err(|_| invalid(field, format!("{} is out of timestamp range", u))),
            Value::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.timestamp())
                .map_err(|e| invalid(field, format!("'{}' is not an RFC 3339 timestamp: {}", s, e))),
            other => Err(invalid(field, format!("{:?} is not a timestamp", other))),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::Timestamp(ts) => ts.to_rfc3339(),
        }
    }

    /// Returns the value as match text, if it is textual or numeric.
    pub fn as_match_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Timestamp(_) => None,
            other => Some(other.to_text()),
        }
    }
}

fn integer_param(field: &FieldDescriptor, n: i128) -> QueryResult<SqlParam> {
    if let Ok(i) = i64::try_from(n) {
        return Ok(SqlParam::Integer(i));
    }
    u64::try_from(n)
        .map(SqlParam::Unsigned)
        .map_err(|_| invalid(field, format!("{} does not fit a 64-bit integer", n)))
}

fn invalid(field: &FieldDescriptor, message: String) -> QueryError {
    QueryError::InvalidValue {
        field: field.name.clone(),
        message,
    }
}
