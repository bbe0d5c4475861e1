use std::sync::Arc;

use crate::bind::BindMode;

/// Error types for sqlx-dao
///
/// Errors are `Clone` so a single failure can be returned through a slot's
/// trailing `Result` and mirrored into the shared [`ErrorSlot`](crate::ErrorSlot).
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Error during SQL template parsing
    #[error("Failed to parse SQL template: {0}")]
    Parse(#[from] regex::Error),

    /// The template mixes bind marker kinds (`:`, `:1`, `:name`)
    #[error("illegal mixed bind mode ({existing} vs {new})")]
    MixedBindMode { existing: BindMode, new: BindMode },

    /// Sequential bind indices start at 1
    #[error("illegal bind index :{0}, sequential indices start at 1")]
    InvalidBindIndex(String),

    /// The slot's function type cannot service the statement's bind variables
    #[error("func {signature} does not match sql {sql}: {reason}")]
    SignatureMismatch {
        sql: String,
        signature: &'static str,
        reason: String,
    },

    /// No execution strategy accepts the slot's function type
    #[error("unsupported func {signature} for sql {sql}")]
    UnsupportedShape { sql: String, signature: &'static str },

    /// Registration of one slot failed
    #[error("failed to register {field} with sql {template}: {source}")]
    Register {
        field: String,
        template: String,
        #[source]
        source: Box<Error>,
    },

    /// Statement execution failed in the driver
    #[error("execute {sql} error: {source}")]
    Execute {
        sql: String,
        #[source]
        source: Arc<sqlx::Error>,
    },

    /// Beginning or committing the named-bind transaction failed
    #[error("failed to {action} transaction: {source}")]
    Transaction {
        action: &'static str,
        #[source]
        source: Arc<sqlx::Error>,
    },

    /// A row could not be scanned into the destination type
    #[error("scan rows {sql} error: {source}")]
    Scan {
        sql: String,
        #[source]
        source: Arc<sqlx::Error>,
    },

    /// The affected-row count does not fit the declared return type
    #[error("unable to convert {count} rows affected to type {target}")]
    RowsAffected { count: u64, target: &'static str },

    /// Placeholder was referenced but no record field matches it
    #[error("Placeholder '{0}' was not bound by any record field")]
    UnboundPlaceholder(String),

    /// A sequential marker refers past the supplied arguments
    #[error("sql {sql} refers to argument {index}, which was not supplied")]
    MissingArgument { sql: String, index: usize },

    /// The slot was called before `register` wired it
    #[error("statement slot {0} called before registration")]
    NotRegistered(&'static str),
}

impl Error {
    pub(crate) fn execute(sql: &str, source: sqlx::Error) -> Self {
        Error::Execute {
            sql: sql.to_owned(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn transaction(action: &'static str, source: sqlx::Error) -> Self {
        Error::Transaction {
            action,
            source: Arc::new(source),
        }
    }

    pub(crate) fn scan(sql: &str, source: sqlx::Error) -> Self {
        Error::Scan {
            sql: sql.to_owned(),
            source: Arc::new(source),
        }
    }
}

/// Result type alias for sqlx-dao operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_error_names_field_and_template() {
        let err = Error::Register {
            field: "find".to_owned(),
            template: "select id from person where id = :1 and age = :age".to_owned(),
            source: Box::new(Error::MixedBindMode {
                existing: BindMode::Seq,
                new: BindMode::Named,
            }),
        };

        let message = err.to_string();
        assert!(message.contains("find"));
        assert!(message.contains("where id = :1"));
        assert!(message.contains("illegal mixed bind mode (seq vs named)"));
    }

    #[test]
    fn test_signature_mismatch_message() {
        let err = Error::SignatureMismatch {
            sql: "create table t(n integer)".to_owned(),
            signature: "fn(i64)",
            reason: "has no bind variables but 1 arguments are declared".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "func fn(i64) does not match sql create table t(n integer): \
             has no bind variables but 1 arguments are declared"
        );
    }

    #[test]
    fn test_error_is_cloneable_with_driver_source() {
        let err = Error::execute("select 1", sqlx::Error::RowNotFound);
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert!(std::error::Error::source(&copy).is_some());
    }
}
