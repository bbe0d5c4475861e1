use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;

/// Type alias for SQLx Query with `Any` arguments
pub type Q<'q> = Query<'q, Any, AnyArguments<'q>>;

/// The SQL type family of a bind parameter.
///
/// A NULL keeps its kind so drivers that type every parameter (`postgres`)
/// see `integer`, `boolean`, ... instead of `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
}

/// A bind parameter, detached from the argument or record field it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(ValueKind),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Binds this value as the next positional parameter of `query`.
    pub fn bind(self, query: Q<'_>) -> Q<'_> {
        match self {
            Value::Null(ValueKind::Bool) => query.bind(None::<bool>),
            Value::Null(ValueKind::Int) => query.bind(None::<i64>),
            Value::Null(ValueKind::Float) => query.bind(None::<f64>),
            Value::Null(ValueKind::Text) => query.bind(None::<String>),
            Value::Null(ValueKind::Bytes) => query.bind(None::<Vec<u8>>),
            Value::Bool(v) => query.bind(v),
            Value::Int(v) => query.bind(v),
            Value::Float(v) => query.bind(v),
            Value::Text(v) => query.bind(v),
            Value::Bytes(v) => query.bind(v),
        }
    }
}

/// Binds `values` in order onto `query`.
pub fn bind_all(query: Q<'_>, values: Vec<Value>) -> Q<'_> {
    values.into_iter().fold(query, |q, value| value.bind(q))
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// A type with a fixed [`ValueKind`], so `None::<T>` binds as a typed NULL.
pub trait ValueType: Into<Value> {
    const KIND: ValueKind;
}

macro_rules! impl_value_type {
    ($kind:ident: $($ty:ty),*) => {
        $(
            impl ValueType for $ty {
                const KIND: ValueKind = ValueKind::$kind;
            }
        )*
    };
}

impl_value_type!(Bool: bool);
impl_value_type!(Int: i8, i16, i32, i64, u8, u16, u32);
impl_value_type!(Float: f32, f64);
impl_value_type!(Text: String, &str);
impl_value_type!(Bytes: Vec<u8>);

impl<T: ValueType> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null(T::KIND), Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(7_u32), Value::Int(7));
        assert_eq!(Value::from("a"), Value::Text("a".to_owned()));
        assert_eq!(Value::from(Some(1.5_f64)), Value::Float(1.5));
        assert_eq!(Value::from(true), Value::Bool(true));
    }

    #[test]
    fn test_null_keeps_its_kind() {
        assert_eq!(Value::from(None::<i64>), Value::Null(ValueKind::Int));
        assert_eq!(Value::from(None::<u8>), Value::Null(ValueKind::Int));
        assert_eq!(Value::from(None::<bool>), Value::Null(ValueKind::Bool));
        assert_eq!(Value::from(None::<f32>), Value::Null(ValueKind::Float));
        assert_eq!(Value::from(None::<String>), Value::Null(ValueKind::Text));
        assert_eq!(Value::from(None::<Vec<u8>>), Value::Null(ValueKind::Bytes));
    }
}
