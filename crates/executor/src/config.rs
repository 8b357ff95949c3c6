use config::{Config as ConfigLoader, Environment, File};
use exchange_core::{EdgeRemoval, SearchBudget, SearchOptions, WeightClasses};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::Error;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    pub max_depth: Option<usize>,
    /// One of `none`, `current_node`, `failed_cycle_nodes`.
    #[serde(default)]
    pub edge_removal: Option<String>,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

impl SearchConfig {
    pub fn options(&self) -> Result<SearchOptions, Error> {
        let edge_removal = match &self.edge_removal {
            Some(name) => name.parse::<EdgeRemoval>()?,
            None => EdgeRemoval::None,
        };

        let options = SearchOptions {
            max_depth: self.max_depth,
            edge_removal,
            budget: SearchBudget {
                max_steps: self.max_steps,
                timeout: self.timeout_ms.map(Duration::from_millis),
            },
        };
        options.validate()?;

        Ok(options)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ItemsConfig {
    pub min_value: u64,
    pub max_value: u64,
    pub value_step: u64,
    /// When false the search runs once over every edge regardless of value.
    #[serde(default = "default_filter_by_weight")]
    pub filter_by_weight: bool,
}

fn default_filter_by_weight() -> bool {
    true
}

impl ItemsConfig {
    pub fn weight_classes(&self) -> Result<WeightClasses, Error> {
        // Validate the range even when it only drives the generator.
        let range = WeightClasses::range(self.min_value, self.max_value, self.value_step)?;

        if self.filter_by_weight {
            Ok(range)
        } else {
            Ok(WeightClasses::Unfiltered)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub users_file: PathBuf,
    pub items_file: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub users: usize,
    pub items_per_user: usize,
    pub wishes_per_user: usize,
    pub seed: u64,
    /// Item values are multiples of `value_step` in `[min_value, max_value]`.
    pub min_value: u64,
    pub max_value: u64,
    pub value_step: u64,
}

impl GeneratorConfig {
    /// Checks the value range with the same rules as the search weight range.
    pub fn validate(&self) -> Result<(), Error> {
        WeightClasses::range(self.min_value, self.max_value, self.value_step)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    pub items: ItemsConfig,
    pub data: DataConfig,
    pub generator: GeneratorConfig,
}

/// Loads configuration from a file and environment variables.
///
/// Environment variables use the `EXCHANGE_` prefix and `__` between
/// section and key, e.g. `EXCHANGE_SEARCH__MAX_DEPTH=4`.
pub fn load_config(config_file_path: &Path) -> Result<Config, Error> {
    if !config_file_path.exists() {
        return Err(Error::ConfigLoadError(format!(
            "Configuration file not found at path: {}",
            config_file_path.display()
        )));
    }

    let s = ConfigLoader::builder()
        .add_source(File::from(config_file_path).required(true))
        .add_source(
            Environment::with_prefix("EXCHANGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    Ok(app_config)
}
