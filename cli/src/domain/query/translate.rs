//! SQL-like syntax translation
//!
//! Rewrites `LIKE` wildcards and null tests into primitive predicates.
//! Comparisons, membership lists and the boolean structure pass through
//! unchanged. Column names are not checked here.

use std::fmt;

use super::ast::{BoolExpr, ColumnName, Comparison, Condition, Expr, Literal, Membership};
use super::error::QueryError;

/// Primitive predicate understood by the evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Compare(Comparison),
    In(Membership),
    Contains { column: String, text: String },
    StartsWith { column: String, text: String },
    EndsWith { column: String, text: String },
    IsNull { column: String },
    IsNotNull { column: String },
}

impl Primitive {
    /// Column the predicate reads
    pub fn column(&self) -> &str {
        match self {
            Self::Compare(cmp) => &cmp.column,
            Self::In(membership) => &membership.column,
            Self::Contains { column, .. }
            | Self::StartsWith { column, .. }
            | Self::EndsWith { column, .. }
            | Self::IsNull { column }
            | Self::IsNotNull { column } => column,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let call = |f: &mut fmt::Formatter<'_>, name: &str, column: &str, text: &str| {
            write!(
                f,
                "{}({}, {})",
                name,
                ColumnName(column),
                Literal::Str(text.to_string())
            )
        };
        match self {
            Self::Compare(cmp) => write!(f, "{}", cmp),
            Self::In(membership) => write!(f, "{}", membership),
            Self::Contains { column, text } => call(f, "contains", column, text),
            Self::StartsWith { column, text } => call(f, "startswith", column, text),
            Self::EndsWith { column, text } => call(f, "endswith", column, text),
            Self::IsNull { column } => write!(f, "isnull({})", ColumnName(column)),
            Self::IsNotNull { column } => write!(f, "notnull({})", ColumnName(column)),
        }
    }
}

/// Query after translation, ready for binding against a table
pub type TranslatedExpr = BoolExpr<Primitive>;

/// Translate a parsed query into primitive predicates
pub fn translate(expr: &Expr) -> Result<TranslatedExpr, QueryError> {
    expr.try_map(&mut |condition| match condition {
        Condition::Compare(cmp) => Ok(Primitive::Compare(cmp.clone())),
        Condition::In(membership) => Ok(Primitive::In(membership.clone())),
        Condition::Like { column, pattern } => rewrite_like(column, pattern),
        Condition::IsNull { column } => Ok(Primitive::IsNull {
            column: column.clone(),
        }),
        Condition::NotNull { column } => Ok(Primitive::IsNotNull {
            column: column.clone(),
        }),
    })
}

/// Map a `LIKE` pattern to contains / starts-with / ends-with.
///
/// Only the outermost `%` are wildcards; inner ones are matched literally.
fn rewrite_like(column: &str, pattern: &str) -> Result<Primitive, QueryError> {
    let column = column.to_string();
    let non_empty = |text: &&str| !text.is_empty();

    // `%text%` must be tried before the one-sided shapes
    if let Some(text) = pattern
        .strip_prefix('%')
        .and_then(|p| p.strip_suffix('%'))
        .filter(non_empty)
    {
        return Ok(Primitive::Contains {
            column,
            text: text.to_string(),
        });
    }
    if let Some(text) = pattern.strip_suffix('%').filter(non_empty) {
        return Ok(Primitive::StartsWith {
            column,
            text: text.to_string(),
        });
    }
    if let Some(text) = pattern.strip_prefix('%').filter(non_empty) {
        return Ok(Primitive::EndsWith {
            column,
            text: text.to_string(),
        });
    }

    Err(QueryError::UnsupportedPattern {
        column,
        pattern: pattern.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::parse;

    fn translated(query: &str) -> TranslatedExpr {
        translate(&parse(query).unwrap()).unwrap()
    }

    fn single(query: &str) -> Primitive {
        match translated(query) {
            BoolExpr::Leaf(p) => p,
            other => panic!("expected a single predicate, got {:?}", other),
        }
    }

    #[test]
    fn test_contains_wins_over_prefix_and_suffix() {
        assert_eq!(
            single(r#"name LIKE "%an%""#),
            Primitive::Contains {
                column: "name".to_string(),
                text: "an".to_string()
            }
        );
    }

    #[test]
    fn test_prefix_and_suffix_patterns() {
        assert_eq!(
            single(r#"name LIKE "An%""#),
            Primitive::StartsWith {
                column: "name".to_string(),
                text: "An".to_string()
            }
        );
        assert_eq!(
            single(r#"name LIKE "%ne""#),
            Primitive::EndsWith {
                column: "name".to_string(),
                text: "ne".to_string()
            }
        );
    }

    #[test]
    fn test_inner_wildcards_are_literal() {
        assert_eq!(
            single(r#"code LIKE "%a%b%""#),
            Primitive::Contains {
                column: "code".to_string(),
                text: "a%b".to_string()
            }
        );
        assert_eq!(
            single(r#"code LIKE "%%""#),
            Primitive::StartsWith {
                column: "code".to_string(),
                text: "%".to_string()
            }
        );
    }

    #[test]
    fn test_pattern_without_wildcard_is_rejected() {
        let expr = parse(r#"name LIKE "Anne""#).unwrap();
        assert_eq!(
            translate(&expr),
            Err(QueryError::UnsupportedPattern {
                column: "name".to_string(),
                pattern: "Anne".to_string()
            })
        );

        let expr = parse(r#"name LIKE "%""#).unwrap();
        assert!(translate(&expr).is_err());
    }

    #[test]
    fn test_null_tests() {
        assert_eq!(
            single("email IS NULL"),
            Primitive::IsNull {
                column: "email".to_string()
            }
        );
        assert_eq!(
            single("email NOT NULL"),
            Primitive::IsNotNull {
                column: "email".to_string()
            }
        );
    }

    #[test]
    fn test_untouched_queries_render_identically() {
        for query in [
            "age > 30",
            "status == 'actif' and (age < 18 or age >= 65)",
            "status not in ('a', 'b') or not score != 1.5",
            "`first name` == 'Anne'",
        ] {
            let parsed = parse(query).unwrap();
            assert_eq!(translate(&parsed).unwrap().to_string(), parsed.to_string());
        }
    }

    #[test]
    fn test_translated_form_renders_primitive_calls() {
        let expr = translated(r#"age > 30 and nom LIKE "%An%" or email IS NULL"#);
        assert_eq!(
            expr.to_string(),
            "age > 30 and contains(nom, 'An') or isnull(email)"
        );
    }

    #[test]
    fn test_column_accessor() {
        assert_eq!(single("age > 1").column(), "age");
        assert_eq!(single(r#"nom like "x%""#).column(), "nom");
    }
}
