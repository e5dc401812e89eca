//! Filter Pipeline
//!
//! Runs one validate-then-apply cycle:
//!
//! ```text
//! ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │1. PARSE │──▶│2. STATUS │──▶│3.TRANSLATE│──▶│4. FILTER │
//! │         │   │          │   │           │   │          │
//! │ Tokens  │   │ Extract  │   │ LIKE      │   │ Bind     │
//! │ AST     │   │ Validate │   │ NULL tests│   │ Evaluate │
//! └─────────┘   └──────────┘   └───────────┘   └──────────┘
//! ```
//!
//! Nothing is evaluated until the query has passed status validation.

use super::error::FilterError;
use super::query::{bind, parse, translate};
use super::status::StatusPolicy;
use crate::data::Table;

/// Validates and applies filter expressions under one status policy
pub struct FilterPipeline<'a> {
    policy: &'a StatusPolicy,
}

impl<'a> FilterPipeline<'a> {
    pub fn new(policy: &'a StatusPolicy) -> Self {
        Self { policy }
    }

    /// Filter `table` with `query`.
    ///
    /// An absent or blank query keeps every row.
    pub fn apply(&self, table: &Table, query: Option<&str>) -> Result<Table, FilterError> {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            tracing::debug!(rows = table.num_rows(), "No query, keeping all rows");
            return Ok(table.clone());
        };

        // 1. Parse
        let expr = parse(query)?;
        tracing::debug!(query = %query, parsed = %expr, "Query parsed");

        // 2. Status whitelist
        self.policy.check(&expr)?;

        // 3. Translate
        let translated = translate(&expr)?;
        tracing::debug!(translated = %translated, "Query translated");

        // 4. Bind and filter
        let predicate = bind(&translated, table)?;
        let mask = predicate.mask(table);
        let filtered = table.filter(&mask)?;
        tracing::debug!(
            rows_in = table.num_rows(),
            rows_out = filtered.num_rows(),
            "Query applied"
        );

        Ok(filtered)
    }
}
