use regex::Regex;

/// Bind markers: `:name`, `:digits`, or a bare `:`.
pub const MARKER_PATTERN: &str = r":[a-zA-Z0-9_]*";

/// A template with its bind markers replaced by positional `?` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// SQL with one `?` per marker
    pub sql: String,
    /// Raw marker tokens in occurrence order, without the leading `:`
    /// (empty for a bare `:`)
    pub vars: Vec<String>,
}

/// Converts bind markers (`:name`, `:1`, `:`) to positional placeholders (`?`).
///
/// # Examples
///
/// ```
/// use sqlx_dao::builder::parse_template;
///
/// let parsed = parse_template("SELECT * FROM users WHERE id = :id AND age > :1")?;
/// assert_eq!(parsed.sql, "SELECT * FROM users WHERE id = ? AND age > ?");
/// assert_eq!(parsed.vars, vec!["id", "1"]);
/// # Ok::<(), sqlx_dao::Error>(())
/// ```
pub fn parse_template(template: &str) -> crate::Result<ParsedTemplate> {
    let regex = Regex::new(MARKER_PATTERN)?;
    let vars = regex
        .find_iter(template)
        .map(|m| m.as_str()[1..].to_owned())
        .collect();
    let sql = regex.replace_all(template, "?").into_owned();
    Ok(ParsedTemplate { sql, vars })
}
