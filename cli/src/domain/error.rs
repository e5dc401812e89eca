//! Errors returned by the filter pipeline

use thiserror::Error;

use super::query::QueryError;
use super::status::ValidationError;
use crate::data::DataError;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Query references a status value outside the whitelist
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query is malformed or does not fit the table
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Row selection failed inside the table layer
    #[error(transparent)]
    Data(#[from] DataError),
}
