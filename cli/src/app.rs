//! Core application

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::data::{Table, read_csv, write_csv};
use crate::domain::{AllowedStatuses, FilterPipeline, StatusPolicy};

pub struct CoreApp {
    pub config: AppConfig,
    pub policy: StatusPolicy,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config)?;
        app.execute()
    }

    /// Resolve configuration and load the status whitelist
    pub fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let allowed = AllowedStatuses::load(&config.status.config).with_context(|| {
            format!(
                "Failed to load status whitelist: {}",
                config.status.config.display()
            )
        })?;
        tracing::debug!(allowed = ?allowed.values(), "Status whitelist loaded");

        let policy = StatusPolicy::new(config.status.column.clone(), allowed);
        if policy.allowed().is_empty() {
            tracing::warn!(
                column = %policy.column(),
                "Status whitelist is empty; every status value will be rejected"
            );
        }
        tracing::debug!(
            column = %policy.column(),
            allowed = policy.allowed().len(),
            "Status policy ready"
        );
        Ok(Self { config, policy })
    }

    /// Read, filter, project and write the table
    pub fn execute(&self) -> Result<()> {
        let config = &self.config;

        let table = read_csv(&config.input, &config.csv)
            .with_context(|| format!("Failed to read input file: {}", config.input.display()))?;

        let filtered =
            FilterPipeline::new(&self.policy).apply(&table, config.query.as_deref())?;

        let output = self.project(filtered)?;

        write_csv(&config.output, &output, &config.csv).with_context(|| {
            format!("Failed to write output file: {}", config.output.display())
        })?;

        tracing::info!(
            rows = output.num_rows(),
            columns = output.num_columns(),
            output = %config.output.display(),
            "Output written"
        );
        Ok(())
    }

    fn project(&self, table: Table) -> Result<Table> {
        match &self.config.fields {
            Some(fields) => Ok(table.project(fields.as_slice())?),
            None => Ok(table),
        }
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
