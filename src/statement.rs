use crate::bind::{resolve_bind_mode, BindMode};
use crate::builder::parse_template;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::value::Value;

const QUERY_KEYWORDS: &[&str] = &[
    "select", "show", "desc", "describe", "explain", "with", "pragma", "values",
];

/// Returns `true` if `sql` reads rows rather than mutating them, judged by its leading keyword.
pub fn is_query_sql(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    QUERY_KEYWORDS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(keyword))
}

/// A slot's template after parsing, fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// Slot name
    pub id: String,
    /// SQL with driver placeholders
    pub sql: String,
    pub bind_mode: BindMode,
    /// Marker tokens in occurrence order; empty strings are bare `:` markers
    pub vars: Vec<String>,
    /// Minimum number of arguments the statement needs
    pub max_index: usize,
    pub is_query: bool,
}

impl ParsedStatement {
    /// Parses `template` for the slot `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template mixes bind marker kinds or uses index `:0`.
    pub fn parse(id: impl Into<String>, template: &str) -> Result<Self> {
        let parsed = parse_template(template)?;
        let (bind_mode, max_index) = resolve_bind_mode(&parsed.vars)?;
        let is_query = is_query_sql(&parsed.sql);

        Ok(Self {
            id: id.into(),
            sql: parsed.sql,
            bind_mode,
            vars: parsed.vars,
            max_index,
            is_query,
        })
    }

    /// Rewrites the placeholders for `dialect`.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.sql = dialect.rewrite(&self.sql);
        self
    }

    pub fn is_bind_by(&self, modes: &[BindMode]) -> bool {
        self.bind_mode.is_any_of(modes)
    }

    /// Orders positional arguments the way the markers consume them.
    ///
    /// Auto markers take the arguments in declaration order; sequential markers
    /// take the 1-based argument at their index, repeats allowed.
    pub fn positional_values(&self, args: &[Value]) -> Result<Vec<Value>> {
        self.vars
            .iter()
            .enumerate()
            .map(|(position, var)| {
                let index = match self.bind_mode {
                    BindMode::Seq => var.parse::<usize>().unwrap_or_default(),
                    _ => position + 1,
                };
                index
                    .checked_sub(1)
                    .and_then(|i| args.get(i))
                    .cloned()
                    .ok_or_else(|| Error::MissingArgument {
                        sql: self.sql.clone(),
                        index,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_query_sql() {
        assert!(is_query_sql("select id from person"));
        assert!(is_query_sql("  SELECT 1"));
        assert!(is_query_sql("with x as (select 1) select * from x"));
        assert!(!is_query_sql("insert into person values(?, ?)"));
        assert!(!is_query_sql("delete from person where id = ?"));
        assert!(!is_query_sql("create table person(id varchar(100))"));
        assert!(!is_query_sql(""));
    }

    #[test]
    fn test_parse_statement() {
        let stmt = ParsedStatement::parse("find", "select id, age from person where id=:1").unwrap();
        assert_eq!(stmt.id, "find");
        assert_eq!(stmt.sql, "select id, age from person where id=?");
        assert_eq!(stmt.bind_mode, BindMode::Seq);
        assert_eq!(stmt.vars, vec!["1"]);
        assert_eq!(stmt.max_index, 1);
        assert!(stmt.is_query);
    }

    #[test]
    fn test_parse_statement_mixed_fails() {
        let err = ParsedStatement::parse("bad", "select * from t where a = : and b = :b").unwrap_err();
        assert!(matches!(err, Error::MixedBindMode { .. }));
    }

    #[test]
    fn test_with_dialect() {
        let stmt = ParsedStatement::parse("add", "insert into person(id, age) values(:id, :age)")
            .unwrap()
            .with_dialect(Dialect::Numbered);
        assert_eq!(stmt.sql, "insert into person(id, age) values($1, $2)");
        assert!(!stmt.is_query);
    }

    #[test]
    fn test_positional_values_seq() {
        let stmt = ParsedStatement::parse("q", "select * from t where a = :2 and b = :1 and c = :2").unwrap();
        let args = vec![Value::from("first"), Value::from(2_i64)];
        let values = stmt.positional_values(&args).unwrap();
        assert_eq!(
            values,
            vec![Value::Int(2), Value::Text("first".to_owned()), Value::Int(2)]
        );
    }

    #[test]
    fn test_positional_values_auto() {
        let stmt = ParsedStatement::parse("q", "select * from t where a = : and b = :").unwrap();
        let args = vec![Value::from(1_i64), Value::from(2_i64), Value::from(3_i64)];
        let values = stmt.positional_values(&args).unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_positional_values_missing_argument() {
        let stmt = ParsedStatement::parse("q", "select * from t where a = :3").unwrap();
        let err = stmt.positional_values(&[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { index: 3, .. }));
    }
}
