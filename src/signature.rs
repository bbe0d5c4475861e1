//! Compile-time description of a slot's function type, checked against its statement at registration.

use std::any::type_name;

use crate::bind::BindMode;
use crate::error::{Error, Result};
use crate::materialize::{Destination, Shape};
use crate::record::{Record, RecordValues};
use crate::statement::ParsedStatement;
use crate::value::{Value, ValueType};

/// Whether an argument is a bind value or carries records for named binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Scalar,
    Records,
}

/// A call argument after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(Value),
    Records(Vec<RecordValues>),
}

/// A type usable as a slot argument.
pub trait Arg: Send + 'static {
    const KIND: ArgKind;

    fn into_argument(self) -> Argument;
}

macro_rules! impl_scalar_arg {
    ($($ty:ty),*) => {
        $(
            impl Arg for $ty {
                const KIND: ArgKind = ArgKind::Scalar;

                fn into_argument(self) -> Argument {
                    Argument::Value(self.into())
                }
            }
        )*
    };
}

impl_scalar_arg!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &'static str);

impl<T> Arg for Option<T>
where
    T: ValueType + Send + 'static,
{
    const KIND: ArgKind = ArgKind::Scalar;

    fn into_argument(self) -> Argument {
        Argument::Value(self.into())
    }
}

impl<R: Record> Arg for Vec<R> {
    const KIND: ArgKind = ArgKind::Records;

    fn into_argument(self) -> Argument {
        Argument::Records(self.iter().map(RecordValues::of).collect())
    }
}

/// A slot's declared return type.
///
/// Plain destinations swallow failures into their zero value; `Result<T, Error>`
/// is the trailing error return and hands the failure to the caller.
pub trait Output: Send + 'static {
    type Value: Destination;

    const TRAILING_ERROR: bool = false;

    fn finish(outcome: Result<Self::Value>) -> Self;
}

macro_rules! impl_plain_output {
    ($($ty:ty),*) => {
        $(
            impl Output for $ty {
                type Value = Self;

                fn finish(outcome: Result<Self>) -> Self {
                    outcome.unwrap_or_default()
                }
            }
        )*
    };
}

impl_plain_output!((), i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f64, String, bool);

impl<R: Record> Output for Vec<R> {
    type Value = Self;

    fn finish(outcome: Result<Self>) -> Self {
        outcome.unwrap_or_default()
    }
}

impl<R: Record> Output for Option<R> {
    type Value = Self;

    fn finish(outcome: Result<Self>) -> Self {
        outcome.unwrap_or_default()
    }
}

impl<T: Destination> Output for std::result::Result<T, Error> {
    type Value = T;

    const TRAILING_ERROR: bool = true;

    fn finish(outcome: Result<T>) -> Self {
        outcome
    }
}

/// What registration needs to know about a function type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnShape {
    pub name: &'static str,
    pub args: Vec<ArgKind>,
    pub output: Shape,
    pub trailing_error: bool,
}

impl FnShape {
    pub fn input_arity(&self) -> usize {
        self.args.len()
    }

    pub fn output_arity(&self) -> usize {
        self.output.arity()
    }
}

/// Implemented for `fn(A, B, ..) -> O` pointer types, which name a slot's call shape.
pub trait Signature: 'static {
    type Output: Output;

    fn shape() -> FnShape;
}

macro_rules! impl_signature {
    ($($arg:ident),*) => {
        impl<$($arg: Arg,)* O: Output> Signature for fn($($arg),*) -> O {
            type Output = O;

            fn shape() -> FnShape {
                FnShape {
                    name: type_name::<Self>(),
                    args: vec![$($arg::KIND),*],
                    output: <O::Value as Destination>::SHAPE,
                    trailing_error: O::TRAILING_ERROR,
                }
            }
        }
    };
}

impl_signature!();
impl_signature!(A);
impl_signature!(A, B);
impl_signature!(A, B, C);
impl_signature!(A, B, C, D);
impl_signature!(A, B, C, D, E);
impl_signature!(A, B, C, D, E, F);

/// Checks that a function of `shape` can supply the statement's bind variables.
///
/// # Errors
///
/// Returns [`Error::SignatureMismatch`] describing the first violated rule.
pub fn validate(stmt: &ParsedStatement, shape: &FnShape) -> Result<()> {
    let arity = shape.input_arity();
    let mismatch = |reason: String| Error::SignatureMismatch {
        sql: stmt.sql.clone(),
        signature: shape.name,
        reason,
    };

    match stmt.bind_mode {
        BindMode::None if arity != 0 => Err(mismatch(format!(
            "has no bind variables but {arity} arguments are declared"
        ))),
        BindMode::Named if arity != 1 => Err(mismatch(format!(
            "requires named variables from exactly one argument, {arity} declared"
        ))),
        BindMode::Named if shape.args[0] != ArgKind::Records => Err(mismatch(
            "requires named variables from a record argument".to_owned(),
        )),
        BindMode::Auto | BindMode::Seq if arity < stmt.max_index => Err(mismatch(format!(
            "requires at least {} arguments, only {arity} declared",
            stmt.max_index
        ))),
        BindMode::Auto | BindMode::Seq if shape.args.contains(&ArgKind::Records) => Err(mismatch(
            "binds by position and cannot take record arguments".to_owned(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(template: &str) -> ParsedStatement {
        ParsedStatement::parse("slot", template).unwrap()
    }

    #[test]
    fn test_shape_of_fn_types() {
        let shape = <fn(String, i64) -> Result<i64> as Signature>::shape();
        assert_eq!(shape.args, vec![ArgKind::Scalar, ArgKind::Scalar]);
        assert_eq!(shape.output, Shape::Scalar);
        assert!(shape.trailing_error);

        let shape = <fn() as Signature>::shape();
        assert_eq!(shape.input_arity(), 0);
        assert_eq!(shape.output_arity(), 0);
        assert!(!shape.trailing_error);
    }

    #[test]
    fn test_no_markers_requires_no_arguments() {
        let stmt = stmt("create table person(id varchar(100))");
        assert!(validate(&stmt, &<fn() as Signature>::shape()).is_ok());
        let err = validate(&stmt, &<fn(i64) as Signature>::shape()).unwrap_err();
        assert!(matches!(err, Error::SignatureMismatch { .. }));
    }

    #[test]
    fn test_seq_requires_max_index_arguments() {
        let stmt = stmt("select age from person where id = :1 and age > :3");
        assert!(validate(&stmt, &<fn(String, i64, i64) -> i64 as Signature>::shape()).is_ok());
        let err = validate(&stmt, &<fn(String, i64) -> i64 as Signature>::shape()).unwrap_err();
        assert!(err.to_string().contains("at least 3 arguments"));
    }

    #[test]
    fn test_auto_requires_marker_count_arguments() {
        let stmt = stmt("delete from person where id = : and age = :");
        assert!(validate(&stmt, &<fn(String) -> i64 as Signature>::shape()).is_err());
        assert!(validate(&stmt, &<fn(String, i64) -> i64 as Signature>::shape()).is_ok());
    }

    #[test]
    fn test_named_requires_one_record_argument() {
        let stmt = stmt("insert into person(id) values(:id)");
        assert!(validate(&stmt, &<fn(String) as Signature>::shape()).is_err());
        assert!(validate(&stmt, &<fn() as Signature>::shape()).is_err());
    }
}
