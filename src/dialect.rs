/// Driver name whose placeholders are numbered (`$1`, `$2`, ...).
pub const POSTGRES_DRIVER: &str = "postgres";

/// Placeholder syntax handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `?` placeholders, passed through unchanged
    #[default]
    QuestionMark,
    /// `$1`, `$2`, ... placeholders
    Numbered,
}

impl Dialect {
    /// Picks the dialect for a driver name.
    pub fn from_driver_name(driver_name: &str) -> Self {
        if driver_name == POSTGRES_DRIVER {
            Dialect::Numbered
        } else {
            Dialect::QuestionMark
        }
    }

    /// Rewrites every `?` of `sql` into this dialect's placeholder syntax.
    ///
    /// ```
    /// use sqlx_dao::Dialect;
    ///
    /// let sql = Dialect::Numbered.rewrite("select * from t where a = ? and b = ?");
    /// assert_eq!(sql, "select * from t where a = $1 and b = $2");
    /// ```
    pub fn rewrite(self, sql: &str) -> String {
        match self {
            Dialect::QuestionMark => sql.to_owned(),
            Dialect::Numbered => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut seq = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        seq += 1;
                        out.push('$');
                        out.push_str(&seq.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_driver_name() {
        assert_eq!(Dialect::from_driver_name("postgres"), Dialect::Numbered);
        assert_eq!(Dialect::from_driver_name("sqlite"), Dialect::QuestionMark);
        assert_eq!(Dialect::from_driver_name("mysql"), Dialect::QuestionMark);
    }

    #[test]
    fn test_numbered_rewrite_is_sequential() {
        let sql = "insert into person(id, age, name) values(?, ?, ?)";
        assert_eq!(
            Dialect::Numbered.rewrite(sql),
            "insert into person(id, age, name) values($1, $2, $3)"
        );
    }

    #[test]
    fn test_question_mark_passes_through() {
        let sql = "select * from person where id = ?";
        assert_eq!(Dialect::QuestionMark.rewrite(sql), sql);
    }

    #[test]
    fn test_rewrite_without_placeholders() {
        assert_eq!(Dialect::Numbered.rewrite("select 1"), "select 1");
    }
}
