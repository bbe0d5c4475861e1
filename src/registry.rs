use sqlx::AnyPool;
use tracing::{debug, error};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::query::{Bound, ErrorSlot, Sql};
use crate::signature::{validate, Signature};
use crate::statement::ParsedStatement;
use crate::strategy::ExecutionStrategy;

/// A struct of statement slots.
///
/// Usually derived: `#[derive(Dao)]` installs every `#[sql = "..."]` field of type
/// [`Sql`] in declaration order and shares the struct's [`ErrorSlot`] field, if any.
/// Hand-written implementations call [`Registrar::attach`] for every slot, then
/// [`Registrar::install`] for each.
pub trait Dao {
    /// Installs the struct's slots, stopping at the first failure.
    fn register_slots(&mut self, registrar: &mut Registrar<'_>) -> Result<()>;
}

/// Parses, validates and wires statement slots against one pool.
pub struct Registrar<'a> {
    dialect: Dialect,
    pool: &'a AnyPool,
    errors: Option<ErrorSlot>,
}

impl<'a> Registrar<'a> {
    pub fn new(driver_name: &str, pool: &'a AnyPool) -> Self {
        Self {
            dialect: Dialect::from_driver_name(driver_name),
            pool,
            errors: None,
        }
    }

    /// Shares `slot` with every slot attached or installed afterwards.
    pub fn error_slot(&mut self, slot: &ErrorSlot) {
        self.errors = Some(slot.clone());
    }

    /// Hands the shared error slot to `slot` without wiring a statement, so a
    /// slot left unwired by an earlier failure still reports its calls.
    pub fn attach<F>(&self, slot: &mut Sql<F>) {
        slot.attach(self.errors.clone());
    }

    /// Parses `template` and wires it into `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Register`] naming the field and template if the template
    /// does not parse, the slot's function type cannot bind its variables, or no
    /// execution strategy fits the function type. The slot is then left unwired.
    pub fn install<F: Signature>(&mut self, field: &str, template: &str, slot: &mut Sql<F>) -> Result<()> {
        self.attach(slot);
        match self.bind::<F>(field, template) {
            Ok(bound) => {
                debug!(
                    field,
                    sql = %bound.statement.sql,
                    bind_mode = %bound.statement.bind_mode,
                    strategy = %bound.strategy,
                    "registered statement"
                );
                slot.install(bound);
                Ok(())
            }
            Err(source) => {
                error!(field, template, error = %source, "failed to register statement");
                Err(Error::Register {
                    field: field.to_owned(),
                    template: template.to_owned(),
                    source: Box::new(source),
                })
            }
        }
    }

    fn bind<F: Signature>(&self, field: &str, template: &str) -> Result<Bound> {
        let statement = ParsedStatement::parse(field, template)?.with_dialect(self.dialect);
        let shape = F::shape();
        validate(&statement, &shape)?;
        let strategy = ExecutionStrategy::select(&statement, &shape)?;

        Ok(Bound {
            statement,
            strategy,
            pool: self.pool.clone(),
            signature: shape.name,
        })
    }
}

/// Wires every statement slot of `dao` to `pool`.
///
/// `driver_name` selects the placeholder dialect: `"postgres"` gets `$1, $2, ...`,
/// every other driver keeps `?`. Registration performs no I/O.
///
/// # Errors
///
/// Returns the first slot's [`Error::Register`]. Slots installed before the
/// failing one stay wired.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::any::{install_default_drivers, AnyPoolOptions};
/// use sqlx_dao::{Dao, ErrorSlot, Sql};
///
/// #[derive(Default, Dao)]
/// struct CounterDao {
///     #[sql = "create table counter(n integer)"]
///     create_table: Sql<fn()>,
///     #[sql = "select count(*) from counter"]
///     count: Sql<fn() -> i64>,
///     err: ErrorSlot,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// install_default_drivers();
/// let pool = AnyPoolOptions::new().max_connections(1).connect("sqlite::memory:").await?;
///
/// let mut dao = CounterDao::default();
/// sqlx_dao::register("sqlite", &pool, &mut dao)?;
///
/// dao.create_table.call().await;
/// assert_eq!(dao.count.call().await, 0);
/// assert!(!dao.err.is_set());
/// # Ok(())
/// # }
/// ```
pub fn register<D: Dao + ?Sized>(driver_name: &str, pool: &AnyPool, dao: &mut D) -> Result<()> {
    let mut registrar = Registrar::new(driver_name, pool);
    dao.register_slots(&mut registrar)
}
