// =============================================================================
// Application Identity
// =============================================================================

/// Application name (binary, paths and log filter target)
pub const APP_NAME: &str = "csvq";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".csvq";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "csvq.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CSVQ_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CSVQ_LOG";

/// Log filter used when neither `CSVQ_LOG` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "warn";

// =============================================================================
// Environment Variables - Input / Output
// =============================================================================

/// Environment variable for the input CSV path
pub const ENV_INPUT: &str = "CSVQ_INPUT";

/// Environment variable for the output CSV path
pub const ENV_OUTPUT: &str = "CSVQ_OUTPUT";

/// Environment variable for the filter expression
pub const ENV_QUERY: &str = "CSVQ_QUERY";

/// Environment variable for the output column list
pub const ENV_FIELDS: &str = "CSVQ_FIELDS";

/// Environment variable for the field delimiter
pub const ENV_DELIMITER: &str = "CSVQ_DELIMITER";

// =============================================================================
// Environment Variables - Status Whitelist
// =============================================================================

/// Environment variable for the status whitelist file
pub const ENV_STATUS_CONFIG: &str = "CSVQ_STATUS_CONFIG";

/// Environment variable for the status column name
pub const ENV_STATUS_COLUMN: &str = "CSVQ_STATUS_COLUMN";

// =============================================================================
// Defaults
// =============================================================================

/// Column checked against the status whitelist
pub const DEFAULT_STATUS_COLUMN: &str = "status";

/// Field delimiter
pub const DEFAULT_DELIMITER: u8 = b',';
