//! Delimited file reader and writer
//!
//! Reading infers the schema over the whole file. Integer, float and boolean
//! inference is kept; every other inferred type is read as text so values
//! are written back exactly as they were read.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::{DataType, Field, Schema};

use super::error::DataError;
use super::table::Table;

/// Options shared by the reader and the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

impl CsvOptions {
    fn format(&self) -> Format {
        Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
    }
}

/// Read a delimited file into a table
pub fn read_csv(path: &Path, options: &CsvOptions) -> Result<Table, DataError> {
    tracing::debug!(path = %path.display(), "Reading CSV");

    let mut file = File::open(path)?;
    let format = options.format();
    let (inferred, records) = format.infer_schema(&mut file, None)?;
    file.rewind()?;

    let schema = Arc::new(text_preserving_schema(&inferred));
    tracing::trace!(schema = ?schema, records, "Inferred CSV schema");

    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .build(file)?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    let table = Table::new(batch)?;
    tracing::debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "CSV loaded"
    );
    Ok(table)
}

/// Write a table, with a header row when `options.has_header` is set.
///
/// The file is written next to `path` under a temporary name and renamed
/// into place, so a failed write never leaves a partial file behind.
pub fn write_csv(path: &Path, table: &Table, options: &CsvOptions) -> Result<(), DataError> {
    tracing::debug!(path = %path.display(), rows = table.num_rows(), "Writing CSV");

    let tmp = temp_path(path);
    let result = write_to(&tmp, table, options).and_then(|()| Ok(fs::rename(&tmp, path)?));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_to(path: &Path, table: &Table, options: &CsvOptions) -> Result<(), DataError> {
    let file = BufWriter::new(File::create(path)?);
    let mut writer = WriterBuilder::new()
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .build(file);
    writer.write(table.batch())?;

    let mut file = writer.into_inner();
    file.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Keep numeric and boolean inference; read everything else as text
fn text_preserving_schema(inferred: &Schema) -> Schema {
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| {
            let data_type = match field.data_type() {
                DataType::Int64 | DataType::Float64 | DataType::Boolean | DataType::Null => {
                    field.data_type().clone()
                }
                _ => DataType::Utf8,
            };
            Field::new(field.name(), data_type, true)
        })
        .collect();
    Schema::new(fields)
}
