//! Table storage layer
//!
//! - `table` - Arrow-backed in-memory table, row selection and projection
//! - `csv` - delimited file reader and atomic writer
//! - `error` - unified error type for the data layer

pub mod csv;
pub mod error;
pub mod table;

pub use csv::{CsvOptions, read_csv, write_csv};
pub use error::DataError;
pub use table::{ColumnKind, Table, Value, parse_field_list};
