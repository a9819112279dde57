use crate::domain::{config::ClientConfig, error::{ClientError, ClientResult}};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager that looks in the standard locations
    pub fn new() -> Self {
        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path: Self::find_project_config_path(),
        }
    }

    /// Create a manager with explicit file locations
    pub fn with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Load configuration: defaults, then the global file, then the project file.
    /// Keys set in a later file override the same keys in an earlier one.
    pub fn load_config(&self) -> ClientResult<ClientConfig> {
        let mut merged = Table::new();

        for path in [&self.global_config_path, &self.project_config_path]
            .into_iter()
            .flatten()
        {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                merge_tables(&mut merged, Self::read_table(path)?);
            }
        }

        ClientConfig::deserialize_table(merged)
    }

    /// Load configuration from one specific file, ignoring the standard locations
    pub fn load_config_from_path(&self, path: &Path) -> ClientResult<ClientConfig> {
        ClientConfig::deserialize_table(Self::read_table(path)?)
    }

    /// Global configuration path
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mycodo-client").join("config.toml"))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut path = current_dir.as_path();

        loop {
            let config_path = path.join(".mycodo").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    fn read_table(path: &Path) -> ClientResult<Table> {
        let content = fs::read_to_string(path).map_err(|e| ClientError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        content.parse::<Table>().map_err(|e| ClientError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    fn deserialize_table(table: Table) -> ClientResult<Self> {
        Value::Table(table).try_into::<ClientConfig>().map_err(|e| ClientError::Config {
            message: format!("Invalid configuration: {}", e),
        })
    }
}

/// Recursively overlay `overlay` onto `base`
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match value {
            Value::Table(incoming) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                    continue;
                }
                base.insert(key, Value::Table(incoming));
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}
