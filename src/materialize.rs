//! Turning result rows and affected-row counts into a slot's return value.

use sqlx::any::AnyRow;
use sqlx::Row;

use crate::record::{ColumnMapping, Record};

/// How a destination type receives results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No value (output arity 0)
    Unit,
    /// A single column value or an affected-row count
    Scalar,
    /// One record; an empty result set yields the zero value
    Record,
    /// Every row, in result order
    Records,
}

impl Shape {
    /// Number of non-error return values.
    pub fn arity(self) -> usize {
        match self {
            Shape::Unit => 0,
            _ => 1,
        }
    }
}

/// A type a statement can return, error aside.
///
/// The `Default` value is the zero value returned on failure and for empty singular results.
pub trait Destination: Default + Sized + Send + 'static {
    const SHAPE: Shape;

    /// Materializes query rows.
    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error>;

    /// Converts a mutation's affected-row count; `None` if the type cannot hold it.
    fn from_rows_affected(_count: u64) -> Option<Self> {
        None
    }
}

/// Scans the first row into `R`, or returns `R::default()` when there are no rows.
pub fn first_record<R: Record>(rows: &[AnyRow]) -> Result<R, sqlx::Error> {
    match rows.first() {
        Some(row) => ColumnMapping::for_row::<R>(row).read(row),
        None => Ok(R::default()),
    }
}

/// Scans every row into `R`; the column mapping is built once from the first row.
pub fn records<R: Record>(rows: &[AnyRow]) -> Result<Vec<R>, sqlx::Error> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let mapping = ColumnMapping::for_row::<R>(first);
    rows.iter().map(|row| mapping.read(row)).collect()
}

impl Destination for () {
    const SHAPE: Shape = Shape::Unit;

    fn from_rows(_rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        Ok(())
    }

    fn from_rows_affected(_count: u64) -> Option<Self> {
        Some(())
    }
}

impl<R: Record> Destination for Vec<R> {
    const SHAPE: Shape = Shape::Records;

    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        records(rows)
    }
}

impl<R: Record> Destination for Option<R> {
    const SHAPE: Shape = Shape::Record;

    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        rows.first()
            .map(|row| ColumnMapping::for_row::<R>(row).read(row))
            .transpose()
    }
}

macro_rules! impl_integer_destination {
    ($($ty:ty),*) => {
        $(
            impl Destination for $ty {
                const SHAPE: Shape = Shape::Scalar;

                fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
                    let Some(row) = rows.first() else {
                        return Ok(Self::default());
                    };
                    let value: i64 = row.try_get(0)?;
                    <$ty>::try_from(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
                }

                fn from_rows_affected(count: u64) -> Option<Self> {
                    <$ty>::try_from(count).ok()
                }
            }
        )*
    };
}

impl_integer_destination!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Destination for f64 {
    const SHAPE: Shape = Shape::Scalar;

    /// Integer columns (`count(*)`, `sum` over integers) are widened.
    #[allow(clippy::cast_precision_loss)]
    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        let Some(row) = rows.first() else {
            return Ok(0.0);
        };
        row.try_get::<f64, _>(0)
            .or_else(|err| row.try_get::<i64, _>(0).map(|v| v as f64).map_err(|_| err))
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_rows_affected(count: u64) -> Option<Self> {
        Some(count as f64)
    }
}

impl Destination for String {
    const SHAPE: Shape = Shape::Scalar;

    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        rows.first().map_or(Ok(String::new()), |row| row.try_get(0))
    }
}

impl Destination for bool {
    const SHAPE: Shape = Shape::Scalar;

    fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        rows.first().map_or(Ok(false), |row| row.try_get(0))
    }
}
