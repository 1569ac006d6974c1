use crate::core::db::connection::SqliteConnection;
use crate::core::error::{Result, TemplateError};
use crate::core::value::Value;
use crate::template::{Template, TemplateBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Database-related configuration.
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or ":memory:"
    pub path: String,
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepConfig {
    AutoCommit,
    NoAutoCommit,
    Commit,
    Rollback,
    Statement {
        sql: String,
    },
    Update {
        #[serde(default)]
        params: Vec<Value>,
    },
    Query {
        #[serde(default)]
        params: Vec<Value>,
    },
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        if config.database.path.trim().is_empty() {
            return Err(TemplateError::Config("database.path must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Builds the configured steps into a template, in file order.
    pub fn template(&self) -> Template<SqliteConnection> {
        self.steps
            .iter()
            .fold(TemplateBuilder::new(), |builder, step| match step {
                StepConfig::AutoCommit => builder.auto_commit(),
                StepConfig::NoAutoCommit => builder.no_auto_commit(),
                StepConfig::Commit => builder.commit(),
                StepConfig::Rollback => builder.rollback(),
                StepConfig::Statement { sql } => builder.statement(sql.as_str()),
                StepConfig::Update { params } => builder.update_with(params.clone()),
                StepConfig::Query { params } => builder.query_with(params.clone()),
            })
            .build()
    }

    pub fn open_database(&self) -> Result<SqliteConnection> {
        SqliteConnection::open(&self.database.path)
    }
}

/// Loads a pipeline configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// use sqlchain::config::load_config;
///
/// let config = load_config("pipeline.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)?;
    PipelineConfig::from_toml_str(&content)
}

/// `<config dir>/sqlchain/pipeline.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlchain").join("pipeline.toml"))
}
