//! Query AST definitions
//!
//! Boolean structure (`and`, `or`, `not`) is shared between the parsed query
//! and its translated form; only the leaf conditions differ.

use std::fmt;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CmpOp {
    /// Operator to use when the operands are swapped (`5 < age` is `age > 5`)
    pub fn mirrored(self) -> Self {
        match self {
            Self::Gt => Self::Lt,
            Self::Lt => Self::Gt,
            Self::Ge => Self::Le,
            Self::Le => Self::Ge,
            op => op,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal operand
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    /// Text of the literal without quotes
    pub fn text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "a string",
            Self::Int(_) | Self::Float(_) => "a number",
            Self::Bool(_) => "a boolean",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One slot of a membership list
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Value(Literal),
    /// Unquoted word, e.g. `status in (actif)`
    Word(String),
    /// Nothing between two separators, e.g. the tail of `('a',)`
    Empty,
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(lit) => write!(f, "{}", lit),
            Self::Word(word) => write!(f, "{}", word),
            Self::Empty => Ok(()),
        }
    }
}

/// `column op literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub op: CmpOp,
    pub value: Literal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", ColumnName(&self.column), self.op, self.value)
    }
}

/// `column [not] in (items)`
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub column: String,
    pub items: Vec<ListItem>,
    pub negated: bool,
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.items.iter().map(ToString::to_string).collect();
        let keyword = if self.negated { "not in" } else { "in" };
        write!(
            f,
            "{} {} ({})",
            ColumnName(&self.column),
            keyword,
            items.join(", ")
        )
    }
}

/// Leaf condition of a parsed query, before translation
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare(Comparison),
    In(Membership),
    Like { column: String, pattern: String },
    IsNull { column: String },
    NotNull { column: String },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(cmp) => write!(f, "{}", cmp),
            Self::In(membership) => write!(f, "{}", membership),
            Self::Like { column, pattern } => {
                write!(f, "{} like {}", ColumnName(column), Literal::Str(pattern.clone()))
            }
            Self::IsNull { column } => write!(f, "{} is null", ColumnName(column)),
            Self::NotNull { column } => write!(f, "{} is not null", ColumnName(column)),
        }
    }
}

/// Boolean combination of leaf conditions
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr<T> {
    Leaf(T),
    Not(Box<BoolExpr<T>>),
    And(Box<BoolExpr<T>>, Box<BoolExpr<T>>),
    Or(Box<BoolExpr<T>>, Box<BoolExpr<T>>),
}

/// Parsed query
pub type Expr = BoolExpr<Condition>;

impl<T> BoolExpr<T> {
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Leaves in left-to-right order
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a T>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Not(inner) => inner.collect_leaves(out),
            Self::And(l, r) | Self::Or(l, r) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
        }
    }

    /// Rebuild the same boolean shape with every leaf converted by `f`
    pub fn try_map<U, E>(
        &self,
        f: &mut impl FnMut(&T) -> Result<U, E>,
    ) -> Result<BoolExpr<U>, E> {
        Ok(match self {
            Self::Leaf(leaf) => BoolExpr::Leaf(f(leaf)?),
            Self::Not(inner) => BoolExpr::negate(inner.try_map(f)?),
            Self::And(l, r) => BoolExpr::and(l.try_map(f)?, r.try_map(f)?),
            Self::Or(l, r) => BoolExpr::or(l.try_map(f)?, r.try_map(f)?),
        })
    }

    /// Evaluate with `test` deciding each leaf, short-circuiting left to right
    pub fn evaluate(&self, test: &mut impl FnMut(&T) -> bool) -> bool {
        match self {
            Self::Leaf(leaf) => test(leaf),
            Self::Not(inner) => !inner.evaluate(test),
            Self::And(l, r) => l.evaluate(test) && r.evaluate(test),
            Self::Or(l, r) => l.evaluate(test) || r.evaluate(test),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            Self::Not(_) => 3,
            Self::Leaf(_) => 4,
        }
    }
}

impl<T: fmt::Display> BoolExpr<T> {
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl<T: fmt::Display> fmt::Display for BoolExpr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_operand(f, 3)
            }
            Self::And(l, r) => {
                l.fmt_operand(f, 2)?;
                f.write_str(" and ")?;
                r.fmt_operand(f, 2)
            }
            Self::Or(l, r) => {
                l.fmt_operand(f, 1)?;
                f.write_str(" or ")?;
                r.fmt_operand(f, 1)
            }
        }
    }
}

/// Column reference, backtick-quoted unless it reads as a plain identifier
pub(crate) struct ColumnName<'a>(pub &'a str);

impl fmt::Display for ColumnName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0;
        let plain = name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_')
            && !is_keyword(name);
        if plain {
            f.write_str(name)
        } else {
            write!(f, "`{}`", name)
        }
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "and" | "or" | "not" | "in" | "like" | "is" | "null" | "true" | "false"
    )
}
