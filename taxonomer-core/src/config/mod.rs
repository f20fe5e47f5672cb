//! Configuration types for Taxonomer

use crate::TaxonomerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub greengenes: GreenGenesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file backing the store; defaults to `<home>/taxonomy.db`
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Delete and recreate the store when opening it
    #[serde(default)]
    pub clobber: bool,
    /// Enforce `REFERENCES` clauses while loading
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoaderConfig {
    /// Stop reading input after this many rows or lineage records
    #[serde(default)]
    pub max_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreenGenesConfig {
    #[serde(default = "default_tax_id_prefix")]
    pub tax_id_prefix: String,
    #[serde(default = "default_tax_id_width")]
    pub tax_id_width: usize,
    /// Name class attached to the raw lineage string of each record's terminal taxon
    #[serde(default = "default_lineage_name_class")]
    pub lineage_name_class: String,
    #[serde(default = "default_download_url")]
    pub download_url: String,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_foreign_keys() -> bool { true }
fn default_tax_id_prefix() -> String { "GG".to_string() }
fn default_tax_id_width() -> usize { 8 }
fn default_lineage_name_class() -> String { "greengenes lineage".to_string() }
fn default_download_url() -> String {
    "http://www.secondgenome.com/go/2011-greengenes-taxonomy/".to_string()
}
fn default_archive_name() -> String { "taxonomy_16S_all_gg_2011_1".to_string() }
fn default_log_level() -> String { "warn".to_string() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            clobber: false,
            foreign_keys: default_foreign_keys(),
        }
    }
}

impl DatabaseConfig {
    /// Configured store path, falling back to the home directory default
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::system::default_database_path)
    }
}

impl Default for GreenGenesConfig {
    fn default() -> Self {
        Self {
            tax_id_prefix: default_tax_id_prefix(),
            tax_id_width: default_tax_id_width(),
            lineage_name_class: default_lineage_name_class(),
            download_url: default_download_url(),
            archive_name: default_archive_name(),
        }
    }
}

impl GreenGenesConfig {
    /// Synthetic identifier for the `n`th discovered taxon, e.g. `GG00000001`
    pub fn tax_id(&self, n: u64) -> String {
        format!(
            "{}{:0width$}",
            self.tax_id_prefix,
            n,
            width = self.tax_id_width
        )
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, TaxonomerError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| TaxonomerError::Configuration(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), TaxonomerError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| TaxonomerError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
