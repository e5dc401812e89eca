use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::{CsvOptions, parse_field_list};
use crate::utils::file::{expand_path, resolve_against};

use super::cli::{CliConfig, parse_delimiter};
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_DELIMITER, DEFAULT_STATUS_COLUMN, ENV_STATUS_CONFIG,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Status whitelist section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StatusFileConfig {
    /// Whitelist file; relative paths are resolved against the config file
    pub config: Option<String>,
    pub column: Option<String>,
}

/// CSV format section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CsvFileConfig {
    pub delimiter: Option<String>,
    pub has_header: Option<bool>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub status: Option<StatusFileConfig>,
    pub csv: Option<CsvFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent()
            && let Some(status) = config.status.as_mut()
            && let Some(whitelist) = status.config.as_mut()
        {
            *whitelist = resolve_against(base, whitelist)
                .to_string_lossy()
                .into_owned();
        }

        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(status) = other.status {
            let current = self.status.get_or_insert_with(StatusFileConfig::default);
            if status.config.is_some() {
                tracing::trace!(config = ?status.config, "Merging status.config");
                current.config = status.config;
            }
            if status.column.is_some() {
                tracing::trace!(column = ?status.column, "Merging status.column");
                current.column = status.column;
            }
        }

        if let Some(csv) = other.csv {
            let current = self.csv.get_or_insert_with(CsvFileConfig::default);
            if csv.delimiter.is_some() {
                tracing::trace!(delimiter = ?csv.delimiter, "Merging csv.delimiter");
                current.delimiter = csv.delimiter;
            }
            if csv.has_header.is_some() {
                tracing::trace!(has_header = ?csv.has_header, "Merging csv.has_header");
                current.has_header = csv.has_header;
            }
        }
    }
}

// =============================================================================
// Final Config Structs
// =============================================================================

/// Status whitelist settings
#[derive(Debug, Clone)]
pub struct StatusConfig {
    pub config: PathBuf,
    pub column: String,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub query: Option<String>,
    /// Output columns; `None` keeps every column
    pub fields: Option<Vec<String>>,
    pub status: StatusConfig,
    pub csv: CsvOptions,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.csvq/csvq.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.csvq/csvq.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_status = file_config.status.unwrap_or_default();
        let file_csv = file_config.csv.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let status_config = cli
            .status_config
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_status.config.as_deref().map(expand_path))
            .with_context(|| {
                format!(
                    "No status whitelist configured. Pass --status-config, set {} \
                     or add status.config to {}",
                    ENV_STATUS_CONFIG, CONFIG_FILE_NAME
                )
            })?;

        let status_column = cli
            .status_column
            .clone()
            .or(file_status.column)
            .unwrap_or_else(|| DEFAULT_STATUS_COLUMN.to_string());

        let file_delimiter = file_csv
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid csv.delimiter in config file: {}", e))?;
        let delimiter = cli
            .delimiter
            .or(file_delimiter)
            .unwrap_or(DEFAULT_DELIMITER);

        // has_header: file config sets default, --no-header CLI flag disables
        let has_header = if cli.no_header {
            false
        } else {
            file_csv.has_header.unwrap_or(true)
        };

        let fields = cli
            .fields
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(parse_field_list);

        let query = cli.query.clone().filter(|q| !q.trim().is_empty());

        let config = Self {
            input: expand_path(&cli.input.to_string_lossy()),
            output: expand_path(&cli.output.to_string_lossy()),
            query,
            fields,
            status: StatusConfig {
                config: status_config,
                column: status_column,
            },
            csv: CsvOptions {
                delimiter,
                has_header,
            },
        };

        tracing::debug!(
            input = %config.input.display(),
            output = %config.output.display(),
            status_config = %config.status.config.display(),
            status_column = %config.status.column,
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Get the profile config path (~/.csvq/csvq.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
