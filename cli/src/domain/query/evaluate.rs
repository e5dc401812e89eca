//! Predicate evaluation over a table
//!
//! Evaluation runs in two phases. [`bind`] resolves every column against the
//! table schema and type-checks every operand; the resulting
//! [`RowPredicate`] then runs over rows and cannot fail. A query therefore
//! either filters the whole table or reports an error before any row is read.

use std::cmp::Ordering;

use super::ast::{BoolExpr, CmpOp, ListItem, Literal};
use super::error::QueryError;
use super::translate::{Primitive, TranslatedExpr};
use crate::data::table::{ColumnKind, Table, Value};

/// Leaf predicate with its column resolved to an index
#[derive(Debug, Clone)]
enum Bound {
    Compare {
        column: usize,
        op: CmpOp,
        value: Literal,
    },
    In {
        column: usize,
        values: Vec<Literal>,
        negated: bool,
    },
    Contains {
        column: usize,
        needle: String,
    },
    StartsWith {
        column: usize,
        needle: String,
    },
    EndsWith {
        column: usize,
        needle: String,
    },
    IsNull {
        column: usize,
    },
    IsNotNull {
        column: usize,
    },
}

/// Query bound to the schema of one table
#[derive(Debug, Clone)]
pub struct RowPredicate {
    expr: BoolExpr<Bound>,
}

/// Resolve columns and check operand types against `table`
pub fn bind(expr: &TranslatedExpr, table: &Table) -> Result<RowPredicate, QueryError> {
    let expr = expr.try_map(&mut |primitive| bind_primitive(primitive, table))?;
    tracing::trace!(leaves = expr.leaves().len(), "Query bound to table");
    Ok(RowPredicate { expr })
}

fn resolve(table: &Table, column: &str) -> Result<(usize, ColumnKind), QueryError> {
    let index = table
        .column_index(column)
        .ok_or_else(|| QueryError::UnknownColumn {
            column: column.to_string(),
            available: table.column_names(),
        })?;
    Ok((index, table.column_kind(index)))
}

fn bind_primitive(primitive: &Primitive, table: &Table) -> Result<Bound, QueryError> {
    let (column, kind) = resolve(table, primitive.column())?;

    let text_only = |op: &str| {
        if matches!(kind, ColumnKind::Text | ColumnKind::Null) {
            Ok(())
        } else {
            Err(QueryError::TypeMismatch {
                column: primitive.column().to_string(),
                op: op.to_string(),
                column_type: kind.as_str(),
                operand: "a string".to_string(),
            })
        }
    };

    Ok(match primitive {
        Primitive::Compare(cmp) => {
            if !cmp.op.is_equality() && !orderable(kind, &cmp.value) {
                return Err(QueryError::TypeMismatch {
                    column: cmp.column.clone(),
                    op: cmp.op.to_string(),
                    column_type: kind.as_str(),
                    operand: cmp.value.kind_name().to_string(),
                });
            }
            Bound::Compare {
                column,
                op: cmp.op,
                value: cmp.value.clone(),
            }
        }
        Primitive::In(membership) => {
            let mut values = Vec::with_capacity(membership.items.len());
            for item in &membership.items {
                match item {
                    ListItem::Value(literal) => values.push(literal.clone()),
                    ListItem::Word(word) => {
                        return Err(QueryError::UnquotedValue {
                            column: membership.column.clone(),
                            word: word.clone(),
                        });
                    }
                    ListItem::Empty => {}
                }
            }
            Bound::In {
                column,
                values,
                negated: membership.negated,
            }
        }
        Primitive::Contains { text, .. } => {
            text_only("contains")?;
            Bound::Contains {
                column,
                needle: text.to_lowercase(),
            }
        }
        Primitive::StartsWith { text, .. } => {
            text_only("startswith")?;
            Bound::StartsWith {
                column,
                needle: text.to_lowercase(),
            }
        }
        Primitive::EndsWith { text, .. } => {
            text_only("endswith")?;
            Bound::EndsWith {
                column,
                needle: text.to_lowercase(),
            }
        }
        Primitive::IsNull { .. } => Bound::IsNull { column },
        Primitive::IsNotNull { .. } => Bound::IsNotNull { column },
    })
}

/// Whether `<`, `>`, `<=`, `>=` make sense between a column and a literal
fn orderable(kind: ColumnKind, literal: &Literal) -> bool {
    match kind {
        ColumnKind::Null => true,
        ColumnKind::Integer | ColumnKind::Float => {
            matches!(literal, Literal::Int(_) | Literal::Float(_))
        }
        ColumnKind::Text => matches!(literal, Literal::Str(_)),
        ColumnKind::Boolean => matches!(literal, Literal::Bool(_)),
    }
}

impl RowPredicate {
    /// Whether row `row` of `table` satisfies the predicate.
    ///
    /// `table` must be the table the predicate was bound to.
    pub fn matches(&self, table: &Table, row: usize) -> bool {
        self.expr
            .evaluate(&mut |bound| test(bound, |column| table.value(column, row)))
    }

    /// One entry per row, true for rows to keep
    pub fn mask(&self, table: &Table) -> Vec<bool> {
        (0..table.num_rows())
            .map(|row| self.matches(table, row))
            .collect()
    }
}

fn test<'a>(bound: &Bound, cell: impl Fn(usize) -> Value<'a>) -> bool {
    match bound {
        Bound::Compare { column, op, value } => compare(cell(*column), *op, value),
        Bound::In {
            column,
            values,
            negated,
        } => {
            let value = cell(*column);
            if value.is_null() {
                return *negated;
            }
            let found = values
                .iter()
                .any(|v| cell_cmp(value, v) == Some(Ordering::Equal));
            found != *negated
        }
        Bound::Contains { column, needle } => {
            text_matches(cell(*column), |s| s.contains(needle.as_str()))
        }
        Bound::StartsWith { column, needle } => {
            text_matches(cell(*column), |s| s.starts_with(needle.as_str()))
        }
        Bound::EndsWith { column, needle } => {
            text_matches(cell(*column), |s| s.ends_with(needle.as_str()))
        }
        Bound::IsNull { column } => cell(*column).is_null(),
        Bound::IsNotNull { column } => !cell(*column).is_null(),
    }
}

fn compare(value: Value<'_>, op: CmpOp, literal: &Literal) -> bool {
    if value.is_null() {
        return op == CmpOp::Ne;
    }
    let ord = cell_cmp(value, literal);
    match op {
        CmpOp::Eq => ord == Some(Ordering::Equal),
        CmpOp::Ne => ord != Some(Ordering::Equal),
        CmpOp::Gt => ord == Some(Ordering::Greater),
        CmpOp::Lt => ord == Some(Ordering::Less),
        CmpOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        CmpOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Order a cell against a literal; `None` when the kinds differ
fn cell_cmp(value: Value<'_>, literal: &Literal) -> Option<Ordering> {
    match (value, literal) {
        (Value::Int(a), Literal::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), Literal::Float(b)) => (a as f64).partial_cmp(b),
        (Value::Float(a), Literal::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Literal::Float(b)) => a.partial_cmp(b),
        (Value::Str(a), Literal::Str(b)) => Some(a.cmp(b.as_str())),
        (Value::Bool(a), Literal::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn text_matches(value: Value<'_>, pred: impl Fn(&str) -> bool) -> bool {
    match value {
        Value::Str(s) => pred(&s.to_lowercase()),
        _ => false,
    }
}
