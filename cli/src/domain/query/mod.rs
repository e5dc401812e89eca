//! Filter query language
//!
//! A small SQL-like language over table columns: comparisons, membership
//! lists, `LIKE` wildcards and null tests combined with `and`, `or`, `not`
//! and parentheses.
//!
//! ## Usage
//!
//! ```no_run
//! use csvq_cli::data::{CsvOptions, read_csv};
//! use csvq_cli::domain::query::{bind, parse, translate};
//!
//! let table = read_csv("people.csv".as_ref(), &CsvOptions::default()).unwrap();
//! let expr = parse(r#"age >= 18 and nom LIKE "%an%""#).unwrap();
//! let predicate = bind(&translate(&expr).unwrap(), &table).unwrap();
//! let adults = table.filter(&predicate.mask(&table)).unwrap();
//! ```

mod ast;
mod error;
mod evaluate;
mod lexer;
mod parser;
mod translate;

#[cfg(test)]
mod tests;

pub use ast::{BoolExpr, CmpOp, Comparison, Condition, Expr, ListItem, Literal, Membership};
pub use error::QueryError;
pub use evaluate::{RowPredicate, bind};
pub use lexer::{Keyword, Token, TokenKind, tokenize};
pub use parser::parse;
pub use translate::{Primitive, TranslatedExpr, translate};
