//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use customs_domain::{Actor, Capability, CustomerId};
use customs_engine::{EngineConfig, StaticAuthorizer};
use customs_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, read from `~/.customs/config.toml` by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Directory scanned documents are copied into
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Who the CLI acts as
    #[serde(default)]
    pub operator: Operator,

    /// Connection settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Engine policy
    #[serde(default)]
    pub engine: EngineConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// The principal operations run as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// Principal name
    #[serde(default = "default_principal")]
    pub principal: String,

    /// Capabilities held by the principal
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,

    /// Customer the operator acts for, if it is a customer account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the default configuration, database and documents.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".customs"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Authorizer granting the operator its configured capabilities.
    pub fn authorizer(&self) -> Result<StaticAuthorizer> {
        let capabilities = self
            .operator
            .capabilities
            .iter()
            .map(|name| {
                Capability::parse(name)
                    .ok_or_else(|| CliError::Config(format!("Unknown capability '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(StaticAuthorizer::new().grant(self.operator.principal.clone(), capabilities))
    }

    /// The actor every command runs as.
    pub fn actor(&self) -> Result<Actor> {
        match &self.operator.customer_id {
            Some(id) => {
                let id = CustomerId::from_string(id)
                    .map_err(|e| CliError::Config(format!("Invalid operator customer_id: {}", e)))?;
                Ok(Actor::customer(self.operator.principal.clone(), id))
            }
            None => Ok(Actor::staff(self.operator.principal.clone())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            documents_dir: default_documents_dir(),
            operator: Operator::default(),
            store: StoreConfig::default(),
            engine: EngineConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            capabilities: default_capabilities(),
            customer_id: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn data_dir() -> PathBuf {
    Config::home().unwrap_or_else(|_| PathBuf::from(".customs"))
}

fn default_database() -> PathBuf {
    data_dir().join("customs.db")
}

fn default_documents_dir() -> PathBuf {
    data_dir().join("documents")
}

fn default_principal() -> String {
    "operator".to_string()
}

fn default_capabilities() -> Vec<String> {
    Capability::ALL.iter().map(|c| c.as_str().to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use customs_domain::traits::Authorizer;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.operator.principal, "operator");
        assert_eq!(config.operator.capabilities.len(), Capability::ALL.len());
        assert!(config.settings.color);
        assert!(config.database.ends_with("customs.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            database = "/tmp/clearance.db"

            [operator]
            principal = "clerk"
            capabilities = ["view-folder", "record-clearance"]

            [engine]
            max_per_page = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.database, PathBuf::from("/tmp/clearance.db"));
        assert_eq!(config.engine.max_per_page, 25);
        assert_eq!(config.engine.min_credential_length, 8);
        assert!(config.store.wal);

        let actor = config.actor().unwrap();
        let authz = config.authorizer().unwrap();
        assert!(authz.authorize(Capability::RecordClearance, &actor));
        assert!(!authz.authorize(Capability::CreateCustomer, &actor));
    }

    #[test]
    fn test_unknown_capability_is_rejected() {
        let mut config = Config::default();
        config.operator.capabilities = vec!["fly".to_string()];
        assert!(config.authorizer().is_err());
    }

    #[test]
    fn test_customer_operator() {
        let mut config = Config::default();
        let id = CustomerId::new();
        config.operator.customer_id = Some(id.to_string());
        assert_eq!(config.actor().unwrap().customer_id, Some(id));

        config.operator.customer_id = Some("garbage".to_string());
        assert!(config.actor().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.settings.format = OutputFormat::Json;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.settings.format, OutputFormat::Json);
        assert_eq!(loaded.operator.capabilities, config.operator.capabilities);
    }
}
