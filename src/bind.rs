use std::fmt;

use crate::error::{Error, Result};

/// How a statement's bind markers take their values.
///
/// A statement uses exactly one mode; mixing marker kinds is a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindMode {
    /// No markers
    #[default]
    None,
    /// Bare `:` markers, bound from arguments in declaration order
    Auto,
    /// `:1`, `:2`, ... markers, bound from the 1-based argument at that index
    Seq,
    /// `:name` markers, bound from the fields of a record argument
    Named,
}

impl BindMode {
    /// Classifies a single marker token (the text after `:`).
    pub fn classify(token: &str) -> Self {
        if token.is_empty() {
            BindMode::Auto
        } else if token.parse::<usize>().is_ok() {
            BindMode::Seq
        } else {
            BindMode::Named
        }
    }

    /// Returns `true` if this mode is one of `modes`.
    pub fn is_any_of(self, modes: &[BindMode]) -> bool {
        modes.contains(&self)
    }
}

impl fmt::Display for BindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindMode::None => "none",
            BindMode::Auto => "auto",
            BindMode::Seq => "seq",
            BindMode::Named => "named",
        };
        f.write_str(name)
    }
}

/// Resolves the bind mode of a token list and the highest argument index it needs.
///
/// For [`BindMode::Auto`] and [`BindMode::Named`] the index is the number of markers;
/// for [`BindMode::Seq`] it is the largest index referenced.
pub fn resolve_bind_mode(vars: &[String]) -> Result<(BindMode, usize)> {
    let mut mode = BindMode::None;
    let mut max_index = 0;

    for var in vars {
        let class = BindMode::classify(var);
        if mode == BindMode::None {
            mode = class;
        } else if mode != class {
            return Err(Error::MixedBindMode {
                existing: mode,
                new: class,
            });
        }

        match class {
            BindMode::Seq => {
                let index = var
                    .parse::<usize>()
                    .ok()
                    .filter(|index| *index > 0)
                    .ok_or_else(|| Error::InvalidBindIndex(var.clone()))?;
                max_index = max_index.max(index);
            }
            _ => max_index += 1,
        }
    }

    Ok((mode, max_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(vars: &[&str]) -> Vec<String> {
        vars.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(BindMode::classify(""), BindMode::Auto);
        assert_eq!(BindMode::classify("12"), BindMode::Seq);
        assert_eq!(BindMode::classify("id"), BindMode::Named);
        assert_eq!(BindMode::classify("1a"), BindMode::Named);
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(resolve_bind_mode(&[]).unwrap(), (BindMode::None, 0));
    }

    #[test]
    fn test_auto_counts_markers() {
        let vars = tokens(&["", "", ""]);
        assert_eq!(resolve_bind_mode(&vars).unwrap(), (BindMode::Auto, 3));
    }

    #[test]
    fn test_seq_takes_max_index() {
        let vars = tokens(&["3", "1", "3"]);
        assert_eq!(resolve_bind_mode(&vars).unwrap(), (BindMode::Seq, 3));
    }

    #[test]
    fn test_named_counts_occurrences() {
        let vars = tokens(&["id", "age", "id"]);
        assert_eq!(resolve_bind_mode(&vars).unwrap(), (BindMode::Named, 3));
    }

    #[test]
    fn test_mixed_auto_and_named_fails() {
        let vars = tokens(&["", "id"]);
        let err = resolve_bind_mode(&vars).unwrap_err();
        assert!(matches!(
            err,
            Error::MixedBindMode {
                existing: BindMode::Auto,
                new: BindMode::Named
            }
        ));
        assert_eq!(err.to_string(), "illegal mixed bind mode (auto vs named)");
    }

    #[test]
    fn test_mixed_seq_and_auto_fails() {
        let vars = tokens(&["1", ""]);
        assert!(matches!(
            resolve_bind_mode(&vars),
            Err(Error::MixedBindMode { .. })
        ));
    }

    #[test]
    fn test_zero_index_rejected() {
        let vars = tokens(&["0"]);
        assert!(matches!(
            resolve_bind_mode(&vars),
            Err(Error::InvalidBindIndex(token)) if token == "0"
        ));
    }
}
