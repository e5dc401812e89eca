//! Status literal extraction
//!
//! Collects every literal compared against the status column through one of
//! the four status-reference forms: `==`, `!=`, `in` and `not in`.
//! Ordering comparisons and `LIKE` patterns are not status references.

use std::collections::BTreeSet;

use crate::domain::query::{Condition, Expr, ListItem};

/// Collect the status literals referenced by a parsed query
pub fn collect_status_values(expr: &Expr, column: &str) -> BTreeSet<String> {
    let mut values = BTreeSet::new();

    for condition in expr.leaves() {
        match condition {
            Condition::Compare(cmp)
                if cmp.op.is_equality() && cmp.column.eq_ignore_ascii_case(column) =>
            {
                values.insert(clean(&cmp.value.text()));
            }
            Condition::In(membership) if membership.column.eq_ignore_ascii_case(column) => {
                for item in &membership.items {
                    let text = match item {
                        ListItem::Value(literal) => clean(&literal.text()),
                        ListItem::Word(word) => clean(word),
                        ListItem::Empty => String::new(),
                    };
                    values.insert(text);
                }
            }
            _ => {}
        }
    }

    values
}

/// Trim whitespace and stray quote characters
fn clean(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"')
        .to_string()
}
