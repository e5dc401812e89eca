//! Status whitelist and validation

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::data::DataError;
use crate::domain::query::Expr;

use super::extract::collect_status_values;

/// Status literals referenced by a query that the whitelist does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Invalid status value(s): {}. Allowed values: {}",
    quoted_list(.invalid),
    quoted_list(.allowed)
)]
pub struct ValidationError {
    /// Rejected values, sorted
    pub invalid: Vec<String>,
    /// Whitelist in configuration order
    pub allowed: Vec<String>,
}

fn quoted_list(values: &[String]) -> String {
    if values.is_empty() {
        return "(none)".to_string();
    }
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shape of the whitelist file
#[derive(Debug, Deserialize)]
struct WhitelistFile {
    #[serde(default)]
    statut: Option<Vec<String>>,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Permitted values of the status column, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedStatuses {
    values: Vec<String>,
}

impl AllowedStatuses {
    /// Build from values, dropping duplicates but keeping first-seen order
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self { values: unique }
    }

    /// Load the `"statut"` array from a JSON whitelist file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        tracing::debug!(path = %path.display(), "Loading status whitelist");
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| match e {
            DataError::Config(msg) => DataError::config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse a whitelist document.
    ///
    /// A document without a `"statut"` key allows nothing.
    pub fn from_json(content: &str) -> Result<Self, DataError> {
        let document: serde_json::Value = serde_json::from_str(content)?;
        let file: WhitelistFile = serde_json::from_value(document)
            .map_err(|e| DataError::config(format!("invalid status whitelist: {}", e)))?;

        for key in file.extra.keys() {
            tracing::debug!(key = %key, "Ignoring whitelist key");
        }

        match file.statut {
            Some(values) => Ok(Self::new(values)),
            None => {
                tracing::debug!("Status whitelist has no 'statut' key");
                Ok(Self::default())
            }
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check extracted status values against the whitelist
pub fn validate_status_values(
    extracted: &BTreeSet<String>,
    allowed: &AllowedStatuses,
) -> Result<(), ValidationError> {
    // BTreeSet iteration is already sorted
    let invalid: Vec<String> = extracted
        .iter()
        .filter(|value| !allowed.contains(value))
        .cloned()
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            invalid,
            allowed: allowed.values().to_vec(),
        })
    }
}

/// Status column paired with its whitelist
#[derive(Debug, Clone)]
pub struct StatusPolicy {
    column: String,
    allowed: AllowedStatuses,
}

impl StatusPolicy {
    pub fn new(column: impl Into<String>, allowed: AllowedStatuses) -> Self {
        Self {
            column: column.into(),
            allowed,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn allowed(&self) -> &AllowedStatuses {
        &self.allowed
    }

    /// Validate every status literal referenced by `expr`
    pub fn check(&self, expr: &Expr) -> Result<(), ValidationError> {
        let extracted = collect_status_values(expr, &self.column);
        tracing::debug!(
            column = %self.column,
            extracted = ?extracted,
            "Status values referenced by query"
        );
        validate_status_values(&extracted, &self.allowed)
    }
}
