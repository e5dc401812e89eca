//! In-memory table
//!
//! A [`Table`] wraps a single Arrow record batch whose columns are
//! normalized to the five kinds the filter evaluator understands.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;

use super::error::DataError;

/// Column kind as seen by the filter evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// No non-null value at all
    Null,
}

impl ColumnKind {
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int64 => Self::Integer,
            DataType::Float64 => Self::Float,
            DataType::Boolean => Self::Boolean,
            DataType::Null => Self::Null,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Null => "null",
        }
    }
}

/// Arrow type a column of `data_type` is stored as inside a [`Table`]
fn normalized_type(data_type: &DataType) -> DataType {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Float32 | DataType::Float64 => DataType::Float64,
        DataType::Boolean => DataType::Boolean,
        DataType::Null => DataType::Null,
        _ => DataType::Utf8,
    }
}

/// Make column names unique by suffixing repeats with `.1`, `.2`, ...
///
/// The first occurrence keeps its name. A suffix already used by another
/// column is skipped, so `a,a,a.1` becomes `a,a.2,a.1`.
fn unique_names(names: &[&str]) -> Vec<String> {
    let original: HashSet<&str> = names.iter().copied().collect();
    let mut taken: HashSet<String> = HashSet::new();

    names
        .iter()
        .map(|&name| {
            if taken.insert(name.to_string()) {
                return name.to_string();
            }
            let renamed = (1..)
                .map(|n| format!("{}.{}", name, n))
                .find(|candidate| !original.contains(candidate.as_str()) && !taken.contains(candidate))
                .unwrap_or_else(|| name.to_string());
            tracing::warn!(column = %name, renamed = %renamed, "Duplicate column name renamed");
            taken.insert(renamed.clone());
            renamed
        })
        .collect()
}

/// Single cell value borrowed from a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'a str),
}

impl Value<'_> {
    /// Missing value; NaN counts as missing
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(x) => x.is_nan(),
            _ => false,
        }
    }
}

/// Ordered, named, row-aligned columns
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wrap a record batch, casting columns to their normalized types.
    ///
    /// Repeated column names get `.1`, `.2`, ... suffixes so every column
    /// can be addressed by name.
    pub fn new(batch: RecordBatch) -> Result<Self, DataError> {
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let names = unique_names(&names);
        let mut fields = Vec::with_capacity(schema.fields().len());
        let mut columns = Vec::with_capacity(schema.fields().len());

        for ((field, column), name) in schema.fields().iter().zip(batch.columns()).zip(names) {
            let target = normalized_type(field.data_type());
            let column = if column.data_type() == &target {
                Arc::clone(column)
            } else {
                tracing::trace!(
                    column = %field.name(),
                    from = %field.data_type(),
                    to = %target,
                    "Normalizing column type"
                );
                cast(column, &target)?
            };
            fields.push(Field::new(name, target, true));
            columns.push(column);
        }

        let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
        let batch = RecordBatch::try_new(schema, columns)?;
        Ok(Self { batch })
    }

    /// Build a table from `(name, column)` pairs
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        Self::new(RecordBatch::try_from_iter(columns)?)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema().index_of(name).ok()
    }

    pub fn column_kind(&self, index: usize) -> ColumnKind {
        ColumnKind::of(self.batch.column(index).data_type())
    }

    /// Cell at `(column, row)`; both indices must be in range
    pub fn value(&self, column: usize, row: usize) -> Value<'_> {
        let array = self.batch.column(column);
        if array.is_null(row) {
            return Value::Null;
        }
        match array.data_type() {
            DataType::Int64 => Value::Int(array.as_primitive::<Int64Type>().value(row)),
            DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(row)),
            DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
            DataType::Utf8 => Value::Str(array.as_string::<i32>().value(row)),
            _ => Value::Null,
        }
    }

    /// Keep the rows whose mask entry is true, in order
    pub fn filter(&self, mask: &[bool]) -> Result<Self, DataError> {
        let mask = BooleanArray::from(mask.to_vec());
        let batch = filter_record_batch(&self.batch, &mask)?;
        Ok(Self { batch })
    }

    /// Keep only `fields`, in the requested order
    pub fn project<S: AsRef<str>>(&self, fields: &[S]) -> Result<Self, DataError> {
        let mut missing: Vec<String> = Vec::new();
        let mut indices = Vec::with_capacity(fields.len());

        for field in fields {
            let name = field.as_ref();
            match self.column_index(name) {
                Some(index) => indices.push(index),
                None if !missing.iter().any(|m| m == name) => missing.push(name.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(DataError::missing_columns(missing));
        }

        let batch = self.batch.project(&indices)?;
        Ok(Self { batch })
    }
}

/// Split a `--fields` value into trimmed column names
pub fn parse_field_list(fields: &str) -> Vec<String> {
    fields.split(',').map(|f| f.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, Int64Array, NullArray, StringArray};

    fn sample() -> Table {
        Table::from_columns([
            (
                "nom",
                Arc::new(StringArray::from(vec![Some("Anne"), None, Some("Paul")])) as ArrayRef,
            ),
            (
                "age",
                Arc::new(Int64Array::from(vec![Some(34), Some(19), None])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_values_by_position() {
        let table = sample();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.value(0, 0), Value::Str("Anne"));
        assert_eq!(table.value(0, 1), Value::Null);
        assert_eq!(table.value(1, 1), Value::Int(19));
        assert_eq!(table.value(1, 2), Value::Null);
    }

    #[test]
    fn test_column_lookup_and_kind() {
        let table = sample();
        assert_eq!(table.column_names(), vec!["nom", "age"]);
        assert_eq!(table.column_index("age"), Some(1));
        assert_eq!(table.column_index("ville"), None);
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.column_kind(1), ColumnKind::Integer);
    }

    #[test]
    fn test_narrow_types_are_normalized() {
        let table = Table::from_columns([
            ("n", Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef),
            ("x", Arc::new(NullArray::new(2)) as ArrayRef),
        ])
        .unwrap();
        assert_eq!(table.column_kind(0), ColumnKind::Integer);
        assert_eq!(table.value(0, 1), Value::Int(2));
        assert_eq!(table.column_kind(1), ColumnKind::Null);
        assert_eq!(table.value(1, 0), Value::Null);
    }

    #[test]
    fn test_nan_counts_as_null() {
        let table = Table::from_columns([(
            "x",
            Arc::new(Float64Array::from(vec![f64::NAN, 1.0])) as ArrayRef,
        )])
        .unwrap();
        assert!(table.value(0, 0).is_null());
        assert!(!table.value(0, 1).is_null());
    }

    #[test]
    fn test_filter_keeps_order() {
        let filtered = sample().filter(&[true, false, true]).unwrap();
        assert_eq!(filtered.num_rows(), 2);
        assert_eq!(filtered.value(0, 0), Value::Str("Anne"));
        assert_eq!(filtered.value(0, 1), Value::Str("Paul"));
    }

    #[test]
    fn test_project_reorders_columns() {
        let projected = sample().project(&["age", "nom"]).unwrap();
        assert_eq!(projected.column_names(), vec!["age", "nom"]);
        assert_eq!(projected.value(1, 0), Value::Str("Anne"));
    }

    #[test]
    fn test_project_reports_every_missing_column() {
        let err = sample().project(&["nom", "email", "ville", "email"]).unwrap_err();
        match err {
            DataError::MissingColumns { missing } => assert_eq!(missing, vec!["email", "ville"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_field_list_is_trimmed() {
        assert_eq!(parse_field_list("nom, age ,status"), vec!["nom", "age", "status"]);
        assert_eq!(parse_field_list("nom,,age"), vec!["nom", "", "age"]);
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let column = || Arc::new(Int64Array::from(vec![1])) as ArrayRef;
        let table =
            Table::from_columns([("a", column()), ("a", column()), ("b", column()), ("a", column())])
                .unwrap();
        assert_eq!(table.column_names(), vec!["a", "a.1", "b", "a.2"]);
        assert_eq!(table.column_index("a.2"), Some(3));
    }

    #[test]
    fn test_suffix_skips_existing_names() {
        assert_eq!(unique_names(&["a", "a", "a.1"]), vec!["a", "a.2", "a.1"]);
        assert_eq!(unique_names(&["x", "y"]), vec!["x", "y"]);
    }
}
