use convert_case::{Case, Casing};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};

use crate::error::{Error, Result};
use crate::value::Value;

/// One field of a [`Record`] type, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The Rust identifier
    pub ident: &'static str,
    /// Explicit column name from `#[column(name = "...")]`
    pub name: Option<&'static str>,
}

impl Field {
    pub const fn new(ident: &'static str, name: Option<&'static str>) -> Self {
        Self { ident, name }
    }

    /// Returns `true` if `column` (or a bind variable name) addresses this field.
    ///
    /// An explicit name must match exactly. Otherwise the identifier is compared
    /// case-insensitively with the column, its CamelCase and its snake_case forms.
    pub fn matches(&self, column: &str) -> bool {
        if let Some(name) = self.name {
            return name == column;
        }

        self.ident.eq_ignore_ascii_case(column)
            || self.ident.eq_ignore_ascii_case(&column.to_case(Case::Pascal))
            || self.ident.eq_ignore_ascii_case(&column.to_case(Case::Snake))
    }
}

/// Returns the index of the first field matching `column`.
pub fn find_field(fields: &[Field], column: &str) -> Option<usize> {
    fields.iter().position(|field| field.matches(column))
}

/// A struct whose fields can be bound by name and scanned from rows.
///
/// Implemented by `#[derive(Record)]`, which also implements [`Arg`](crate::Arg),
/// [`Destination`](crate::Destination) and [`Output`](crate::Output) for the type.
pub trait Record: Default + Send + 'static {
    const FIELDS: &'static [Field];

    /// Decodes `column` of `row` into field number `field`.
    fn decode_field(
        &mut self,
        field: usize,
        row: &AnyRow,
        column: usize,
    ) -> std::result::Result<(), sqlx::Error>;

    /// Field values in declaration order.
    fn to_values(&self) -> Vec<Value>;
}

/// A record's field values, detached from its type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValues {
    fields: &'static [Field],
    values: Vec<Value>,
}

impl RecordValues {
    pub fn of<R: Record>(record: &R) -> Self {
        Self {
            fields: R::FIELDS,
            values: record.to_values(),
        }
    }

    /// Resolves each bind variable name to a field value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundPlaceholder`] for a name no field matches.
    pub fn bind_values(&self, vars: &[String]) -> Result<Vec<Value>> {
        vars.iter()
            .map(|var| {
                find_field(self.fields, var)
                    .and_then(|index| self.values.get(index))
                    .cloned()
                    .ok_or_else(|| Error::UnboundPlaceholder(var.clone()))
            })
            .collect()
    }
}

/// Result-set columns aligned with destination fields; `None` columns are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping(Vec<Option<usize>>);

impl ColumnMapping {
    pub fn new<'a>(fields: &[Field], columns: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            columns
                .into_iter()
                .map(|column| find_field(fields, column))
                .collect(),
        )
    }

    /// Builds the mapping for `R` from the columns of `row`.
    pub fn for_row<R: Record>(row: &AnyRow) -> Self {
        Self::new(R::FIELDS, row.columns().iter().map(|c| c.name()))
    }

    /// `(column, field)` pairs of every mapped column.
    pub fn mapped(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(column, field)| field.map(|field| (column, field)))
    }

    #[cfg(test)]
    fn field_of(&self, column: usize) -> Option<usize> {
        self.0.get(column).copied().flatten()
    }

    /// Scans one row into a fresh `R`.
    pub fn read<R: Record>(&self, row: &AnyRow) -> std::result::Result<R, sqlx::Error> {
        let mut out = R::default();
        for (column, field) in self.mapped() {
            out.decode_field(field, row, column)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    const PERSON: &[Field] = &[
        Field::new("id", None),
        Field::new("age", None),
        Field::new("user_name", None),
        Field::new("nick", Some("nick_name")),
    ];

    #[test]
    fn test_identifier_match_is_case_insensitive() {
        assert!(Field::new("Age", None).matches("age"));
        assert!(Field::new("age", None).matches("AGE"));
    }

    #[test]
    fn test_snake_column_matches_camel_identifier() {
        assert!(Field::new("UserName", None).matches("user_name"));
        assert!(Field::new("user_name", None).matches("userName"));
    }

    #[test]
    fn test_explicit_name_takes_precedence() {
        let field = Field::new("nick", Some("nick_name"));
        assert!(field.matches("nick_name"));
        assert!(!field.matches("nick"));
        assert!(!field.matches("NICK_NAME"));
    }

    #[test]
    fn test_first_matching_field_wins() {
        let fields = &[Field::new("id", None), Field::new("ID", None)];
        assert_eq!(find_field(fields, "id"), Some(0));
    }

    #[test]
    fn test_column_mapping_discards_unknown_columns() {
        let mapping = ColumnMapping::new(PERSON, ["age", "extra", "id", "nick_name"]);
        assert_eq!(mapping.field_of(0), Some(1));
        assert_eq!(mapping.field_of(1), None);
        assert_eq!(mapping.field_of(2), Some(0));
        assert_eq!(mapping.field_of(3), Some(3));
        assert_eq!(
            mapping.mapped().collect::<Vec<_>>(),
            vec![(0, 1), (2, 0), (3, 3)]
        );
    }

    #[test]
    fn test_bind_values_by_variable_name() {
        let record = RecordValues {
            fields: PERSON,
            values: vec![
                Value::from("100"),
                Value::from(30_i64),
                Value::from("ann"),
                Value::from("a"),
            ],
        };
        let vars = vec!["age".to_owned(), "id".to_owned(), "age".to_owned()];
        assert_eq!(
            record.bind_values(&vars).unwrap(),
            vec![Value::Int(30), Value::Text("100".to_owned()), Value::Int(30)]
        );
    }

    #[test]
    fn test_bind_values_unknown_variable() {
        let record = RecordValues {
            fields: PERSON,
            values: vec![Value::Null(ValueKind::Text); 4],
        };
        let err = record.bind_values(&["missing".to_owned()]).unwrap_err();
        assert!(matches!(err, Error::UnboundPlaceholder(name) if name == "missing"));
    }
}
