//! Configuration types and parsing for salesmart.yml

use crate::entity::EntityKind;
use crate::error::{CoreError, CoreResult};
use crate::field::{DateFormats, DEFAULT_DATE_FORMATS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--target` flag is given
pub const TARGET_ENV_VAR: &str = "SM_TARGET";

/// Main project configuration from salesmart.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory holding the raw input files
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,

    /// Directory prepared CSVs are written to
    #[serde(default = "default_prepared_dir")]
    pub prepared_dir: String,

    /// Raw input file name per entity, relative to `raw_dir`
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Field delimiter of the raw input files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Date formats tried in order (chrono syntax)
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// IQR outlier screening
    #[serde(default)]
    pub outliers: OutlierConfig,

    /// Warehouse connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Schema the star-schema tables are created in (default: main)
    #[serde(default)]
    pub schema: Option<String>,

    /// Named target configurations (e.g., dev, prod)
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Raw input file names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    #[serde(default = "default_customer_input")]
    pub customer: String,
    #[serde(default = "default_product_input")]
    pub product: String,
    #[serde(default = "default_sale_input")]
    pub sale: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            customer: default_customer_input(),
            product: default_product_input(),
            sale: default_sale_input(),
        }
    }
}

impl InputsConfig {
    /// File name for an entity
    pub fn for_entity(&self, entity: EntityKind) -> &str {
        match entity {
            EntityKind::Customer => &self.customer,
            EntityKind::Product => &self.product,
            EntityKind::Sale => &self.sale,
        }
    }
}

/// Outlier screening settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlierConfig {
    /// Drop rows outside the IQR bounds
    #[serde(default)]
    pub enabled: bool,

    /// IQR multiplier `k`
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            multiplier: default_multiplier(),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file, or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// True for a non-persistent in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Schema override
    #[serde(default)]
    pub schema: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_raw_dir() -> String {
    "data/raw".to_string()
}

fn default_prepared_dir() -> String {
    "data/prepared".to_string()
}

fn default_customer_input() -> String {
    "customers_data.csv".to_string()
}

fn default_product_input() -> String {
    "products_data.csv".to_string()
}

fn default_sale_input() -> String {
    "sales_data.csv".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for salesmart.yml or salesmart.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("salesmart.yml");
        let yaml_path = dir.join("salesmart.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "delimiter must be a single ASCII character other than '\"', got {:?}",
                    self.delimiter
                ),
            });
        }

        if self.date_formats.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "date_formats must list at least one format".to_string(),
            });
        }

        if !(self.outliers.multiplier.is_finite() && self.outliers.multiplier > 0.0) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "outliers.multiplier must be a positive number, got {}",
                    self.outliers.multiplier
                ),
            });
        }

        for entity in EntityKind::ALL {
            if self.inputs.for_entity(entity).trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("inputs.{} cannot be empty", entity),
                });
            }
        }

        Ok(())
    }

    /// Date formats as the normalizer consumes them
    pub fn date_formats(&self) -> DateFormats {
        DateFormats::new(self.date_formats.clone())
    }

    /// Get absolute raw directory relative to a project root
    pub fn raw_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.raw_dir)
    }

    /// Get absolute prepared directory relative to a project root
    pub fn prepared_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.prepared_dir)
    }

    /// Absolute path of an entity's raw input file
    pub fn input_path(&self, root: &Path, entity: EntityKind) -> PathBuf {
        self.raw_dir_absolute(root)
            .join(self.inputs.for_entity(entity))
    }

    /// Get the list of available target names
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get database configuration, optionally applying target overrides
    ///
    /// A relative DuckDB file path is left as written; callers resolve it
    /// against the project root.
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;
                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Schema for the warehouse tables, optionally applying target overrides
    pub fn get_schema(&self, target: Option<&str>) -> Option<&str> {
        target
            .and_then(|name| self.targets.get(name))
            .and_then(|t| t.schema.as_deref())
            .or(self.schema.as_deref())
    }

    /// Resolve target from CLI flag or SM_TARGET environment variable
    ///
    /// Priority: CLI flag > SM_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
