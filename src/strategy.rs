use std::any::type_name;
use std::fmt;

use sqlx::AnyPool;
use sqlx::{Executor, Statement};
use tracing::debug;

use crate::bind::BindMode;
use crate::error::{Error, Result};
use crate::materialize::Destination;
use crate::record::RecordValues;
use crate::signature::{Argument, FnShape};
use crate::statement::ParsedStatement;
use crate::value::{bind_all, Value};

/// The call-time behavior of a slot, chosen once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Executes the statement with no parameters
    NoArgExec,
    /// Executes once per record inside one transaction, binding variables by field name
    NamedBindExec,
    /// Runs a query with positional parameters and materializes the rows
    SeqQuery,
    /// Runs a mutation with positional parameters and returns the affected-row count
    SeqExec,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl ExecutionStrategy {
    /// Selects the strategy for a validated statement and function shape.
    ///
    /// The first matching rule wins:
    ///
    /// | inputs | bind mode        | outputs | statement | strategy      |
    /// |--------|------------------|---------|-----------|---------------|
    /// | 0      | none             | 0       | any       | `NoArgExec`     |
    /// | 1      | named            | 0       | any       | `NamedBindExec` |
    /// | any    | seq, auto, none  | 1       | query     | `SeqQuery`      |
    /// | any    | seq, auto        | 1       | mutation  | `SeqExec`       |
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] if no rule matches.
    pub fn select(stmt: &ParsedStatement, shape: &FnShape) -> Result<Self> {
        let inputs = shape.input_arity();
        let outputs = shape.output_arity();

        let strategy = if inputs == 0 && stmt.is_bind_by(&[BindMode::None]) && outputs == 0 {
            ExecutionStrategy::NoArgExec
        } else if inputs == 1 && stmt.is_bind_by(&[BindMode::Named]) && outputs == 0 {
            ExecutionStrategy::NamedBindExec
        } else if stmt.is_query
            && stmt.is_bind_by(&[BindMode::Seq, BindMode::Auto, BindMode::None])
            && outputs == 1
        {
            ExecutionStrategy::SeqQuery
        } else if !stmt.is_query && stmt.is_bind_by(&[BindMode::Seq, BindMode::Auto]) && outputs == 1 {
            ExecutionStrategy::SeqExec
        } else {
            return Err(Error::UnsupportedShape {
                sql: stmt.sql.clone(),
                signature: shape.name,
            });
        };

        Ok(strategy)
    }

    /// Runs the strategy with one call's arguments.
    pub(crate) async fn run<D: Destination>(
        self,
        stmt: &ParsedStatement,
        pool: &AnyPool,
        signature: &'static str,
        args: Vec<Argument>,
    ) -> Result<D> {
        let unsupported = || Error::UnsupportedShape {
            sql: stmt.sql.clone(),
            signature,
        };

        match self {
            ExecutionStrategy::NoArgExec => {
                exec_no_args(stmt, pool).await?;
                Ok(D::default())
            }
            ExecutionStrategy::NamedBindExec => {
                let records = match args.into_iter().next() {
                    Some(Argument::Records(records)) => records,
                    _ => return Err(unsupported()),
                };
                exec_named(stmt, pool, &records).await?;
                Ok(D::default())
            }
            ExecutionStrategy::SeqQuery => {
                let values = scalar_values(args).ok_or_else(unsupported)?;
                query_seq(stmt, pool, &values).await
            }
            ExecutionStrategy::SeqExec => {
                let values = scalar_values(args).ok_or_else(unsupported)?;
                exec_seq(stmt, pool, &values).await
            }
        }
    }
}

fn scalar_values(args: Vec<Argument>) -> Option<Vec<Value>> {
    args.into_iter()
        .map(|arg| match arg {
            Argument::Value(value) => Some(value),
            Argument::Records(_) => None,
        })
        .collect()
}

async fn exec_no_args(stmt: &ParsedStatement, pool: &AnyPool) -> Result<()> {
    debug!(statement = %stmt.id, sql = %stmt.sql, "executing without bind variables");

    sqlx::query(&stmt.sql)
        .execute(pool)
        .await
        .map_err(|e| Error::execute(&stmt.sql, e))?;
    Ok(())
}

/// Executes the prepared statement once per record in a single transaction.
///
/// On failure the transaction is dropped without an explicit rollback; sqlx rolls
/// back a dropped, uncommitted transaction when its connection is next used.
async fn exec_named(stmt: &ParsedStatement, pool: &AnyPool, records: &[RecordValues]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|record| record.bind_values(&stmt.vars))
        .collect::<Result<Vec<_>>>()?;
    debug!(statement = %stmt.id, sql = %stmt.sql, args = ?rows, "executing named batch");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::transaction("begin", e))?;

    let prepared = (&mut *tx)
        .prepare(stmt.sql.as_str())
        .await
        .map_err(|e| Error::execute(&stmt.sql, e))?;

    for values in rows {
        bind_all(prepared.query(), values)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::execute(&stmt.sql, e))?;
    }

    tx.commit()
        .await
        .map_err(|e| Error::transaction("commit", e))
}

async fn query_seq<D: Destination>(stmt: &ParsedStatement, pool: &AnyPool, args: &[Value]) -> Result<D> {
    let values = stmt.positional_values(args)?;
    debug!(statement = %stmt.id, sql = %stmt.sql, args = ?values, "executing query");

    let rows = bind_all(sqlx::query(&stmt.sql), values)
        .fetch_all(pool)
        .await
        .map_err(|e| Error::execute(&stmt.sql, e))?;

    D::from_rows(&rows).map_err(|e| Error::scan(&stmt.sql, e))
}

async fn exec_seq<D: Destination>(stmt: &ParsedStatement, pool: &AnyPool, args: &[Value]) -> Result<D> {
    let values = stmt.positional_values(args)?;
    debug!(statement = %stmt.id, sql = %stmt.sql, args = ?values, "executing mutation");

    let result = bind_all(sqlx::query(&stmt.sql), values)
        .execute(pool)
        .await
        .map_err(|e| Error::execute(&stmt.sql, e))?;

    let count = result.rows_affected();
    D::from_rows_affected(count).ok_or(Error::RowsAffected {
        count,
        target: type_name::<D>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    fn select<F: Signature>(template: &str) -> Result<ExecutionStrategy> {
        let stmt = ParsedStatement::parse("slot", template)?;
        ExecutionStrategy::select(&stmt, &F::shape())
    }

    #[test]
    fn test_no_arg_exec() {
        assert_eq!(
            select::<fn()>("create table person(id varchar(100))").unwrap(),
            ExecutionStrategy::NoArgExec
        );
        assert_eq!(
            select::<fn() -> Result<()>>("create table person(id varchar(100))").unwrap(),
            ExecutionStrategy::NoArgExec
        );
    }

    #[test]
    fn test_seq_query_for_no_marker_query_with_output() {
        assert_eq!(
            select::<fn() -> i64>("select count(*) from person").unwrap(),
            ExecutionStrategy::SeqQuery
        );
    }

    #[test]
    fn test_seq_query_and_exec() {
        assert_eq!(
            select::<fn(String) -> String>("select id from person where id = :1").unwrap(),
            ExecutionStrategy::SeqQuery
        );
        assert_eq!(
            select::<fn(String) -> i64>("delete from person where id = :").unwrap(),
            ExecutionStrategy::SeqExec
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        // positional mutation without an output
        assert!(matches!(
            select::<fn(String)>("delete from person where id = :1"),
            Err(Error::UnsupportedShape { .. })
        ));
        // mutation without markers but with a count
        assert!(matches!(
            select::<fn() -> i64>("delete from person"),
            Err(Error::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_scalar_values_rejects_records() {
        let args = vec![Argument::Value(Value::Int(1)), Argument::Records(Vec::new())];
        assert!(scalar_values(args).is_none());
    }
}
