//! Status whitelist enforcement
//!
//! - `extract` - collect status literals referenced by a query
//! - `policy` - whitelist loading, validation and the [`StatusPolicy`] context

mod extract;
mod policy;

pub use extract::collect_status_values;
pub use policy::{AllowedStatuses, StatusPolicy, ValidationError, validate_status_values};
