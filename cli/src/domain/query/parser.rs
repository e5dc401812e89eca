//! Recursive-descent query parser
//!
//! Precedence from loosest to tightest: `or`, `and`, `not`, predicates.
//! Status references (`==`, `!=`, `in`, `not in`) and the SQL-like forms
//! (`like`, `is null`, `is not null`, `not null`) are dedicated productions.

use super::ast::{BoolExpr, Comparison, Condition, Expr, ListItem, Literal, Membership};
use super::error::QueryError;
use super::lexer::{Keyword, Token, TokenKind, tokenize};

/// Maximum depth of parentheses and `not` prefixes
const MAX_NESTING: usize = 128;

/// Maximum number of conditions in one query
const MAX_CONDITIONS: usize = 1024;

/// Parse a filter expression into its AST
pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        conditions: 0,
    };
    let expr = parser.parse_or()?;
    match parser.next() {
        None => Ok(expr),
        Some(Token {
            kind: TokenKind::RParen,
            offset,
        }) => Err(QueryError::UnbalancedParen { offset }),
        Some(token) => Err(QueryError::unexpected(
            token.kind.to_string(),
            "'and', 'or' or end of query",
            token.offset,
        )),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    conditions: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Offset of the next token, or of the last one at end of input
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.offset)
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        if self.depth >= MAX_NESTING {
            return Err(QueryError::TooDeep {
                offset,
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.peek() == Some(&TokenKind::Keyword(kw)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next token or fail with what was expected
    fn expect_any(&mut self, expected: &'static str) -> Result<Token, QueryError> {
        self.next().ok_or(QueryError::UnexpectedEnd { expected })
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            left = BoolExpr::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_not()?;
        while self.eat_keyword(Keyword::And) {
            let right = self.parse_not()?;
            left = BoolExpr::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, QueryError> {
        let offset = self.offset();
        if self.eat_keyword(Keyword::Not) {
            let inner = self.nested(offset, Self::parse_not)?;
            return Ok(BoolExpr::negate(inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        if let Some(Token {
            kind: TokenKind::LParen,
            offset,
        }) = self.tokens.get(self.pos).cloned()
        {
            self.pos += 1;
            let inner = self.nested(offset, Self::parse_or)?;
            return match self.next() {
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => Ok(inner),
                Some(token) => Err(QueryError::unexpected(
                    token.kind.to_string(),
                    "')'",
                    token.offset,
                )),
                None => Err(QueryError::UnbalancedParen { offset }),
            };
        }
        self.parse_predicate().map(BoolExpr::Leaf)
    }

    fn parse_predicate(&mut self) -> Result<Condition, QueryError> {
        self.conditions += 1;
        if self.conditions > MAX_CONDITIONS {
            return Err(QueryError::TooManyConditions {
                offset: self.offset(),
                limit: MAX_CONDITIONS,
            });
        }
        let token = self.expect_any("a condition")?;
        match token.kind {
            TokenKind::Ident(column) => self.parse_column_predicate(column),
            TokenKind::Str { .. }
            | TokenKind::Number(_)
            | TokenKind::Minus
            | TokenKind::Keyword(Keyword::True | Keyword::False) => {
                self.pos -= 1;
                self.parse_reversed_comparison()
            }
            other => Err(QueryError::unexpected(
                other.to_string(),
                "a column name",
                token.offset,
            )),
        }
    }

    fn parse_column_predicate(&mut self, column: String) -> Result<Condition, QueryError> {
        let token = self.expect_any("an operator")?;
        match token.kind {
            TokenKind::Op(op) => {
                let value = self.parse_literal()?;
                Ok(Condition::Compare(Comparison { column, op, value }))
            }
            TokenKind::Keyword(Keyword::In) => self.parse_membership(column, false),
            TokenKind::Keyword(Keyword::Not) => {
                let next = self.expect_any("'in' or 'null'")?;
                match next.kind {
                    TokenKind::Keyword(Keyword::In) => self.parse_membership(column, true),
                    TokenKind::Keyword(Keyword::Null) => Ok(Condition::NotNull { column }),
                    other => Err(QueryError::unexpected(
                        other.to_string(),
                        "'in' or 'null'",
                        next.offset,
                    )),
                }
            }
            TokenKind::Keyword(Keyword::Is) => {
                let negated = self.eat_keyword(Keyword::Not);
                let next = self.expect_any("'null'")?;
                match next.kind {
                    TokenKind::Keyword(Keyword::Null) if negated => {
                        Ok(Condition::NotNull { column })
                    }
                    TokenKind::Keyword(Keyword::Null) => Ok(Condition::IsNull { column }),
                    other => Err(QueryError::unexpected(other.to_string(), "'null'", next.offset)),
                }
            }
            TokenKind::Keyword(Keyword::Like) => {
                let next = self.expect_any("a quoted pattern")?;
                match next.kind {
                    TokenKind::Str { value, .. } => Ok(Condition::Like {
                        column,
                        pattern: value,
                    }),
                    other => Err(QueryError::unexpected(
                        other.to_string(),
                        "a quoted pattern",
                        next.offset,
                    )),
                }
            }
            other => Err(QueryError::unexpected(
                other.to_string(),
                "an operator",
                token.offset,
            )),
        }
    }

    /// `literal op column`, stored as `column op' literal`
    fn parse_reversed_comparison(&mut self) -> Result<Condition, QueryError> {
        let value = self.parse_literal()?;
        let token = self.expect_any("an operator")?;
        let op = match token.kind {
            TokenKind::Op(op) => op,
            other => {
                return Err(QueryError::unexpected(
                    other.to_string(),
                    "an operator",
                    token.offset,
                ));
            }
        };
        let token = self.expect_any("a column name")?;
        let column = match token.kind {
            TokenKind::Ident(column) => column,
            other => {
                return Err(QueryError::unexpected(
                    other.to_string(),
                    "a column name",
                    token.offset,
                ));
            }
        };
        Ok(Condition::Compare(Comparison {
            column,
            op: op.mirrored(),
            value,
        }))
    }

    fn parse_membership(&mut self, column: String, negated: bool) -> Result<Condition, QueryError> {
        let open = self.expect_any("'('")?;
        if open.kind != TokenKind::LParen {
            return Err(QueryError::unexpected(open.kind.to_string(), "'('", open.offset));
        }

        let mut items = Vec::new();
        loop {
            let item = match self.peek() {
                Some(TokenKind::Comma | TokenKind::RParen) | None => ListItem::Empty,
                Some(TokenKind::Ident(word)) => {
                    let word = word.clone();
                    self.pos += 1;
                    ListItem::Word(word)
                }
                Some(_) => ListItem::Value(self.parse_literal()?),
            };
            items.push(item);

            match self.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => continue,
                Some(Token {
                    kind: TokenKind::RParen,
                    ..
                }) => break,
                Some(token) => {
                    return Err(QueryError::unexpected(
                        token.kind.to_string(),
                        "',' or ')'",
                        token.offset,
                    ));
                }
                None => return Err(QueryError::UnbalancedParen { offset: open.offset }),
            }
        }

        Ok(Condition::In(Membership {
            column,
            items,
            negated,
        }))
    }

    fn parse_literal(&mut self) -> Result<Literal, QueryError> {
        let token = self.expect_any("a value")?;
        match token.kind {
            TokenKind::Str { value, .. } => Ok(Literal::Str(value)),
            TokenKind::Number(text) => Ok(number_literal(&text, false)),
            TokenKind::Minus => {
                let next = self.expect_any("a number")?;
                match next.kind {
                    TokenKind::Number(text) => Ok(number_literal(&text, true)),
                    other => Err(QueryError::unexpected(other.to_string(), "a number", next.offset)),
                }
            }
            TokenKind::Keyword(Keyword::True) => Ok(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::False) => Ok(Literal::Bool(false)),
            other => Err(QueryError::unexpected(other.to_string(), "a value", token.offset)),
        }
    }
}

/// Integers stay exact when they fit in i64; everything else is a float
fn number_literal(text: &str, negative: bool) -> Literal {
    let signed = if negative {
        format!("-{}", text)
    } else {
        text.to_string()
    };
    match signed.parse::<i64>() {
        Ok(i) => Literal::Int(i),
        Err(_) => Literal::Float(signed.parse::<f64>().unwrap_or(f64::NAN)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::ast::CmpOp;

    fn leaf(expr: &Expr) -> &Condition {
        match expr {
            BoolExpr::Leaf(cond) => cond,
            other => panic!("expected a leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_simple_comparison() {
        let expr = parse("age > 30").unwrap();
        assert_eq!(
            leaf(&expr),
            &Condition::Compare(Comparison {
                column: "age".to_string(),
                op: CmpOp::Gt,
                value: Literal::Int(30),
            })
        );
    }

    #[test]
    fn test_negative_and_float_literals() {
        let expr = parse("age > -1").unwrap();
        assert!(matches!(
            leaf(&expr),
            Condition::Compare(Comparison { value: Literal::Int(-1), .. })
        ));

        let expr = parse("score <= 2.5").unwrap();
        assert!(matches!(
            leaf(&expr),
            Condition::Compare(Comparison { value: Literal::Float(x), .. }) if *x == 2.5
        ));
    }

    #[test]
    fn test_reversed_comparison_is_mirrored() {
        let expr = parse("5 < age").unwrap();
        assert_eq!(
            leaf(&expr),
            &Condition::Compare(Comparison {
                column: "age".to_string(),
                op: CmpOp::Gt,
                value: Literal::Int(5),
            })
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a == 1 or b == 2 and c == 3").unwrap();
        let BoolExpr::Or(_, right) = expr else {
            panic!("expected or at the root");
        };
        assert!(matches!(*right, BoolExpr::And(..)));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(a == 1 or b == 2) and c == 3").unwrap();
        let BoolExpr::And(left, _) = expr else {
            panic!("expected and at the root");
        };
        assert!(matches!(*left, BoolExpr::Or(..)));
    }

    #[test]
    fn test_not_prefix_and_keyword_case() {
        let expr = parse("NOT a == 1 AND b == 2").unwrap();
        let BoolExpr::And(left, _) = expr else {
            panic!("expected and at the root");
        };
        assert!(matches!(*left, BoolExpr::Not(_)));
    }

    #[test]
    fn test_membership_lists() {
        let expr = parse("status not in ('a', \"b\", 3)").unwrap();
        assert_eq!(
            leaf(&expr),
            &Condition::In(Membership {
                column: "status".to_string(),
                items: vec![
                    ListItem::Value(Literal::Str("a".to_string())),
                    ListItem::Value(Literal::Str("b".to_string())),
                    ListItem::Value(Literal::Int(3)),
                ],
                negated: true,
            })
        );
    }

    #[test]
    fn test_malformed_lists_keep_empty_slots() {
        let expr = parse("status in ('a',)").unwrap();
        let Condition::In(m) = leaf(&expr) else {
            panic!("expected membership");
        };
        assert_eq!(
            m.items,
            vec![ListItem::Value(Literal::Str("a".to_string())), ListItem::Empty]
        );

        let expr = parse("status in ()").unwrap();
        let Condition::In(m) = leaf(&expr) else {
            panic!("expected membership");
        };
        assert_eq!(m.items, vec![ListItem::Empty]);
    }

    #[test]
    fn test_bare_words_in_lists() {
        let expr = parse("status in (actif, inactif)").unwrap();
        let Condition::In(m) = leaf(&expr) else {
            panic!("expected membership");
        };
        assert_eq!(
            m.items,
            vec![
                ListItem::Word("actif".to_string()),
                ListItem::Word("inactif".to_string())
            ]
        );
    }

    #[test]
    fn test_sql_like_forms() {
        let expr = parse(r#"nom LIKE "%An%""#).unwrap();
        assert_eq!(
            leaf(&expr),
            &Condition::Like {
                column: "nom".to_string(),
                pattern: "%An%".to_string()
            }
        );

        let expr = parse("email IS NULL").unwrap();
        assert_eq!(leaf(&expr), &Condition::IsNull { column: "email".to_string() });

        for query in ["email IS NOT NULL", "email NOT NULL", "email not null"] {
            let expr = parse(query).unwrap();
            assert_eq!(leaf(&expr), &Condition::NotNull { column: "email".to_string() });
        }
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            parse("(a == 1"),
            Err(QueryError::UnbalancedParen { offset: 0 })
        );
        assert_eq!(
            parse("a == 1)"),
            Err(QueryError::UnbalancedParen { offset: 6 })
        );
        assert_eq!(
            parse("status in ('a'"),
            Err(QueryError::UnbalancedParen { offset: 10 })
        );
    }

    #[test]
    fn test_dangling_operands_fail() {
        assert_eq!(
            parse("age >"),
            Err(QueryError::UnexpectedEnd { expected: "a value" })
        );
        assert_eq!(
            parse("age > 1 and"),
            Err(QueryError::UnexpectedEnd { expected: "a condition" })
        );
        assert!(matches!(
            parse("age 30"),
            Err(QueryError::UnexpectedToken { expected: "an operator", .. })
        ));
        assert!(matches!(
            parse("a == 1 b == 2"),
            Err(QueryError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_column_to_column_is_rejected() {
        assert!(matches!(
            parse("a > b"),
            Err(QueryError::UnexpectedToken { expected: "a value", .. })
        ));
    }

    #[test]
    fn test_like_requires_quoted_pattern() {
        assert!(matches!(
            parse("nom like An"),
            Err(QueryError::UnexpectedToken { expected: "a quoted pattern", .. })
        ));
    }

    #[test]
    fn test_deep_parentheses_are_rejected() {
        let query = format!("{}age > 0{}", "(".repeat(2000), ")".repeat(2000));
        assert_eq!(
            parse(&query),
            Err(QueryError::TooDeep {
                offset: MAX_NESTING,
                limit: MAX_NESTING
            })
        );
    }

    #[test]
    fn test_deep_not_chain_is_rejected() {
        let query = format!("{}age > 0", "not ".repeat(2000));
        assert!(matches!(
            parse(&query),
            Err(QueryError::TooDeep { offset, .. }) if offset == MAX_NESTING * 4
        ));
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let query = format!(
            "{}age > 0{}",
            "(".repeat(MAX_NESTING),
            ")".repeat(MAX_NESTING)
        );
        assert!(matches!(
            leaf(&parse(&query).unwrap()),
            Condition::Compare(Comparison { column, .. }) if column == "age"
        ));
    }

    #[test]
    fn test_long_condition_chains_are_capped() {
        let within = vec!["age > 0"; MAX_CONDITIONS].join(" or ");
        assert!(parse(&within).is_ok());

        let beyond = vec!["age > 0"; MAX_CONDITIONS + 1].join(" or ");
        assert!(matches!(
            parse(&beyond),
            Err(QueryError::TooManyConditions { limit, .. }) if limit == MAX_CONDITIONS
        ));
    }
}
