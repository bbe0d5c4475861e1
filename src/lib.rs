//! # sqlx-dao
//!
//! Declarative data-access structs for SQLx. Annotate statement slots with SQL
//! templates, register the struct once against a pool, and call the slots as typed
//! async functions: parameter binding and row scanning are derived from the slot's
//! declared function type.
//!
//! ## Features
//!
//! - **Three Bind Styles**: `:name` binds record fields, `:1`/`:2` bind arguments by
//!   index, bare `:` binds arguments in order
//! - **Checked at Registration**: templates are parsed and matched against each slot's
//!   signature before any slot can run
//! - **Typed Results**: records, `Option` and `Vec` of records, scalars, and affected-row
//!   counts
//! - **Batch Inserts**: a `Vec` of records runs once per record inside one transaction
//! - **Driver Agnostic**: runs on SQLx's `Any` driver; `postgres` gets `$n` placeholders
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["any", "sqlite", "runtime-tokio"] }
//! sqlx-dao = "0.1"
//! ```
//!
//! ```rust,no_run
//! use sqlx::any::{install_default_drivers, AnyPoolOptions};
//! use sqlx_dao::{Dao, Error, ErrorSlot, Record, Sql};
//!
//! #[derive(Debug, Clone, Default, PartialEq, Record)]
//! struct Person {
//!     id: String,
//!     age: i64,
//! }
//!
//! #[derive(Default, Dao)]
//! struct PersonDao {
//!     #[sql = "create table person(id varchar(100), age integer)"]
//!     create_table: Sql<fn()>,
//!     #[sql = "insert into person(id, age) values(:id, :age)"]
//!     add: Sql<fn(Person)>,
//!     #[sql = "insert into person(id, age) values(:id, :age)"]
//!     add_all: Sql<fn(Vec<Person>)>,
//!     #[sql = "select id, age from person where id = :1"]
//!     find: Sql<fn(String) -> Person>,
//!     #[sql = "select id, age from person"]
//!     list_all: Sql<fn() -> Vec<Person>>,
//!     #[sql = "delete from person where id = :1"]
//!     delete: Sql<fn(String) -> Result<i64, Error>>,
//!     err: ErrorSlot,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! install_default_drivers();
//! let pool = AnyPoolOptions::new().max_connections(1).connect("sqlite::memory:").await?;
//!
//! let mut dao = PersonDao::default();
//! sqlx_dao::register("sqlite", &pool, &mut dao)?;
//!
//! dao.create_table.call().await;
//! dao.add.call(Person { id: "100".into(), age: 100 }).await;
//! assert_eq!(dao.find.call("100".into()).await.age, 100);
//! assert_eq!(dao.delete.call("100".into()).await?, 1);
//! assert_eq!(dao.find.call("100".into()).await, Person::default());
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! Registration runs a small pipeline per slot:
//!
//! 1. **Parse**: bind markers become `?` placeholders (or `$n` for `postgres`) and their
//!    tokens are kept in order
//! 2. **Resolve**: the tokens fix one bind mode; mixing marker kinds is an error
//! 3. **Validate**: the slot's argument count and kinds must supply every marker
//! 4. **Dispatch**: the bind mode, statement kind and return shape select one of four
//!    execution strategies, fixed for the slot's lifetime
//!
//! At call time the strategy binds the arguments, runs the statement and materializes the
//! result; query columns are matched to record fields by explicit `#[column(name = "..")]`
//! or by case-insensitive identifier.
//!
//! ## Errors
//!
//! A failed call is logged, written to the DAO's [`ErrorSlot`] field (if it has one) and
//! returns the zero value of its return type, or `Err` when the slot returns
//! `Result<_, Error>`. The error slot is cleared at the start of every call.
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

extern crate self as sqlx_dao;

pub mod bind;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod materialize;
pub mod query;
pub mod record;
pub mod registry;
pub mod signature;
pub mod statement;
pub mod strategy;
pub mod value;

pub use bind::BindMode;
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use materialize::{Destination, Shape};
pub use query::{ErrorSlot, Sql};
pub use record::{ColumnMapping, Field, Record, RecordValues};
pub use registry::{register, Dao, Registrar};
pub use signature::{Arg, ArgKind, Argument, Output, Signature};
pub use statement::ParsedStatement;
pub use strategy::ExecutionStrategy;
pub use value::{Value, ValueKind, ValueType};

pub use sqlx_dao_derive::{Dao, Record};

#[doc(hidden)]
pub use sqlx;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{register, Dao, ErrorSlot, Record, Sql};
}
