use clap::Parser;

use std::path::PathBuf;

use super::constants::{
    APP_NAME, ENV_CONFIG, ENV_DELIMITER, ENV_FIELDS, ENV_INPUT, ENV_OUTPUT, ENV_QUERY,
    ENV_STATUS_COLUMN, ENV_STATUS_CONFIG,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version, about = "Filter CSV files with a SQL-like query", long_about = None)]
pub struct Cli {
    /// Input CSV file
    #[arg(long, short = 'i', env = ENV_INPUT)]
    pub input: PathBuf,

    /// Output CSV file
    #[arg(long, short = 'o', env = ENV_OUTPUT)]
    pub output: PathBuf,

    /// Filter expression, e.g. "age > 30 and status in ('actif')"
    #[arg(long, short = 'q', env = ENV_QUERY)]
    pub query: Option<String>,

    /// Comma-separated output columns (default: all)
    #[arg(long, short = 'f', env = ENV_FIELDS)]
    pub fields: Option<String>,

    /// JSON file holding the allowed status values under "statut"
    #[arg(long, short = 's', env = ENV_STATUS_CONFIG)]
    pub status_config: Option<PathBuf>,

    /// Column checked against the status whitelist
    #[arg(long, env = ENV_STATUS_COLUMN)]
    pub status_column: Option<String>,

    /// Single-byte field delimiter ("\t" or "tab" for tabs)
    #[arg(long, short = 'd', env = ENV_DELIMITER, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Input has no header row
    #[arg(long)]
    pub no_header: bool,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

/// Parse a field delimiter from CLI/env/config string
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    if matches!(s, "\\t" | "tab") {
        return Ok(b'\t');
    }
    match s.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'"' && *byte != b'\n' && *byte != b'\r' => {
            Ok(*byte)
        }
        _ => Err(format!(
            "Invalid delimiter '{}'. Expected a single ASCII character other than a quote or newline",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub query: Option<String>,
    pub fields: Option<String>,
    pub status_config: Option<PathBuf>,
    pub status_column: Option<String>,
    pub delimiter: Option<u8>,
    pub no_header: bool,
    pub config: Option<PathBuf>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            output: cli.output,
            query: cli.query,
            fields: cli.fields,
            status_config: cli.status_config,
            status_column: cli.status_column,
            delimiter: cli.delimiter,
            no_header: cli.no_header,
            config: cli.config,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
