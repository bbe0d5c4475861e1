use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sqlx::AnyPool;
use tracing::error;

use crate::error::{Error, Result};
use crate::signature::{Arg, Argument, Output, Signature};
use crate::statement::ParsedStatement;
use crate::strategy::ExecutionStrategy;

/// The error of the most recent failed call, shared by every slot of one DAO.
///
/// Each call clears the slot before running and writes its error on failure, so
/// the value must be read right after the call of interest. Calls sharing a DAO
/// from several tasks overwrite each other's outcome; use one DAO per task if the
/// slot matters.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Option<Error>>>);

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The error of the last call, if it failed.
    pub fn get(&self) -> Option<Error> {
        self.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn set(&self, err: Error) {
        *self.lock() = Some(err);
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<Error>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything a registered slot needs at call time.
pub(crate) struct Bound {
    pub(crate) statement: ParsedStatement,
    pub(crate) strategy: ExecutionStrategy,
    pub(crate) pool: AnyPool,
    pub(crate) signature: &'static str,
}

impl Bound {
    async fn invoke<O: Output>(&self, args: Vec<Argument>) -> Result<O::Value> {
        let outcome = self
            .strategy
            .run::<O::Value>(&self.statement, &self.pool, self.signature, args)
            .await;

        if let Err(err) = &outcome {
            error!(statement = %self.statement.id, error = %err, "statement failed");
        }
        outcome
    }
}

/// A statement slot of a DAO struct.
///
/// `F` is the slot's call shape written as a function pointer type, e.g.
/// `Sql<fn(String) -> Person>` or `Sql<fn(Vec<Person>) -> Result<(), Error>>`.
/// The slot does nothing until [`register`](crate::register) wires it; after
/// that `call` runs the statement with the declared argument and return types.
/// A slot left unwired by a failed registration still reports
/// [`Error::NotRegistered`] through the DAO's [`ErrorSlot`].
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::AnyPool;
/// use sqlx_dao::{Dao, Record, Sql};
///
/// #[derive(Debug, Default, Record)]
/// struct Person {
///     id: String,
///     age: i64,
/// }
///
/// #[derive(Default, Dao)]
/// struct PersonDao {
///     #[sql = "select id, age from person where id = :1"]
///     find: Sql<fn(String) -> Person>,
/// }
///
/// # async fn example(pool: AnyPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut dao = PersonDao::default();
/// sqlx_dao::register("sqlite", &pool, &mut dao)?;
///
/// let person = dao.find.call("100".to_owned()).await;
/// println!("{person:?}");
/// # Ok(())
/// # }
/// ```
pub struct Sql<F> {
    bound: Option<Bound>,
    errors: Option<ErrorSlot>,
    _signature: PhantomData<F>,
}

impl<F> Default for Sql<F> {
    fn default() -> Self {
        Self {
            bound: None,
            errors: None,
            _signature: PhantomData,
        }
    }
}

impl<F> fmt::Debug for Sql<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sql")
            .field("signature", &type_name::<F>())
            .field("statement", &self.statement())
            .field("strategy", &self.strategy())
            .finish()
    }
}

impl<F> Sql<F> {
    pub fn is_registered(&self) -> bool {
        self.bound.is_some()
    }

    pub fn statement(&self) -> Option<&ParsedStatement> {
        self.bound.as_ref().map(|bound| &bound.statement)
    }

    pub fn strategy(&self) -> Option<ExecutionStrategy> {
        self.bound.as_ref().map(|bound| bound.strategy)
    }

    pub(crate) fn attach(&mut self, errors: Option<ErrorSlot>) {
        self.errors = errors;
    }

    pub(crate) fn install(&mut self, bound: Bound) {
        self.bound = Some(bound);
    }
}

impl<F: Signature> Sql<F> {
    async fn invoke(&self, args: Vec<Argument>) -> F::Output {
        if let Some(errors) = &self.errors {
            errors.clear();
        }

        let outcome = match &self.bound {
            Some(bound) => bound.invoke::<F::Output>(args).await,
            None => {
                let err = Error::NotRegistered(type_name::<F>());
                error!(error = %err, "statement failed");
                Err(err)
            }
        };

        if let (Err(err), Some(errors)) = (&outcome, &self.errors) {
            errors.set(err.clone());
        }
        <F::Output as Output>::finish(outcome)
    }
}

macro_rules! impl_call {
    ($($arg:ident: $ty:ident),*) => {
        impl<$($ty: Arg,)* O: Output> Sql<fn($($ty),*) -> O> {
            /// Runs the slot's statement.
            ///
            /// Failures are logged and written to the DAO's [`ErrorSlot`]; the
            /// return value is then the zero value, or `Err` for a
            /// `Result<_, Error>` return type.
            pub async fn call(&self, $($arg: $ty),*) -> O {
                self.invoke(vec![$($arg.into_argument()),*]).await
            }
        }
    };
}

impl_call!();
impl_call!(a: A);
impl_call!(a: A, b: B);
impl_call!(a: A, b: B, c: C);
impl_call!(a: A, b: B, c: C, d: D);
impl_call!(a: A, b: B, c: C, d: D, e: E);
impl_call!(a: A, b: B, c: C, d: D, e: E, f: F);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_slot_is_shared_between_clones() {
        let slot = ErrorSlot::new();
        let copy = slot.clone();

        copy.set(Error::UnboundPlaceholder("id".to_owned()));
        assert!(slot.is_set());
        assert!(matches!(slot.get(), Some(Error::UnboundPlaceholder(_))));

        slot.clear();
        assert!(!copy.is_set());
    }

    #[tokio::test]
    async fn test_unregistered_slot_returns_zero_value() {
        let slot: Sql<fn(String) -> i64> = Sql::default();
        assert!(!slot.is_registered());
        assert_eq!(slot.call("x".to_owned()).await, 0);
    }

    #[tokio::test]
    async fn test_unregistered_slot_writes_error_slot() {
        let errors = ErrorSlot::new();
        errors.set(Error::UnboundPlaceholder("stale".to_owned()));

        let mut slot: Sql<fn() -> i64> = Sql::default();
        slot.attach(Some(errors.clone()));

        assert_eq!(slot.call().await, 0);
        assert!(matches!(errors.get(), Some(Error::NotRegistered(_))));
    }

    #[tokio::test]
    async fn test_unregistered_slot_with_trailing_error() {
        let slot: Sql<fn() -> Result<()>> = Sql::default();
        assert!(matches!(slot.call().await, Err(Error::NotRegistered(_))));
    }
}
