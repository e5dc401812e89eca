//! Query validation and filtering
//!
//! - `query` - filter language: lexer, parser, translator and evaluator
//! - `status` - status whitelist extraction and validation
//! - `pipeline` - validate-then-apply orchestration

pub mod error;
pub mod pipeline;
pub mod query;
pub mod status;

pub use error::FilterError;
pub use pipeline::FilterPipeline;
pub use status::{AllowedStatuses, StatusPolicy, ValidationError};
