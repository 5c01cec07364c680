/*!
 * Configuration support for the servisheet engine
 *
 * Runtime knobs for the rendering surfaces: worksheet naming, which date
 * rendering each artifact uses, and the styled column widths. Loadable from
 * a TOML file, environment variables, or built programmatically.
 */

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

/// Runtime configuration for export and import runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Worksheet name in the styled artifact
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Render xlsx dates as day-month-year text (ISO when false)
    #[serde(default = "default_true")]
    pub xlsx_day_month_year: bool,

    /// Render csv dates as day-month-year text (ISO when false)
    #[serde(default)]
    pub csv_day_month_year: bool,

    /// Wrap text in the notes columns of the styled artifact
    #[serde(default = "default_true")]
    pub wrap_notes: bool,

    /// Column width for the notes columns in the styled artifact
    #[serde(default = "default_notes_width")]
    pub notes_column_width: f64,

    /// Column width for the address column
    #[serde(default = "default_address_width")]
    pub address_column_width: f64,

    /// Column width for the name column
    #[serde(default = "default_name_width")]
    pub name_column_width: f64,

    /// Column width for everything else
    #[serde(default = "default_column_width")]
    pub default_column_width: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            xlsx_day_month_year: true,
            csv_day_month_year: false,
            wrap_notes: true,
            notes_column_width: default_notes_width(),
            address_column_width: default_address_width(),
            name_column_width: default_name_width(),
            default_column_width: default_column_width(),
        }
    }
}

// Default value functions for serde
fn default_sheet_name() -> String {
    "Customer Data".to_string()
}

fn default_true() -> bool {
    true
}

fn default_notes_width() -> f64 {
    40.0
}

fn default_address_width() -> f64 {
    30.0
}

fn default_name_width() -> f64 {
    20.0
}

fn default_column_width() -> f64 {
    15.0
}

impl SheetConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `SERVISHEET_SHEET_NAME`: worksheet name
    /// - `SERVISHEET_XLSX_DMY`: "true" or "false"
    /// - `SERVISHEET_CSV_DMY`: "true" or "false"
    /// - `SERVISHEET_WRAP_NOTES`: "true" or "false"
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SERVISHEET_SHEET_NAME") {
            if !val.trim().is_empty() {
                config.sheet_name = val;
            }
        }

        if let Ok(val) = std::env::var("SERVISHEET_XLSX_DMY") {
            config.xlsx_day_month_year = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("SERVISHEET_CSV_DMY") {
            config.csv_day_month_year = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("SERVISHEET_WRAP_NOTES") {
            config.wrap_notes = val.to_lowercase() == "true";
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| crate::ServisheetError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::ServisheetError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/servisheet/config.toml` on Unix-like systems
    /// or `%APPDATA%\servisheet\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "servisheet")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location, environment, or defaults
    ///
    /// Priority order:
    /// 1. Default config file (if exists)
    /// 2. Environment variables
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(config_path) = Self::default_config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::from_file(&config_path) {
                    return config;
                }
            }
        }

        Self::from_env()
    }
}

// Global configuration support
use std::sync::RwLock;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<Option<SheetConfig>> = RwLock::new(None);
}

/// Set the global configuration
pub fn set_global_config(config: SheetConfig) {
    if let Ok(mut guard) = GLOBAL_CONFIG.write() {
        *guard = Some(config);
    }
}

/// Get the global configuration (or default if not set)
pub fn global_config() -> SheetConfig {
    GLOBAL_CONFIG
        .read()
        .ok()
        .and_then(|guard| guard.as_ref().cloned())
        .unwrap_or_else(SheetConfig::load)
}

/// Clear the global configuration
pub fn clear_global_config() {
    if let Ok(mut guard) = GLOBAL_CONFIG.write() {
        *guard = None;
    }
}

/// Builder for customizing configuration
pub struct ConfigBuilder {
    config: SheetConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: SheetConfig::default(),
        }
    }

    /// Set the worksheet name
    pub fn sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// Render xlsx dates as day-month-year
    pub fn xlsx_day_month_year(mut self, dmy: bool) -> Self {
        self.config.xlsx_day_month_year = dmy;
        self
    }

    /// Render csv dates as day-month-year
    pub fn csv_day_month_year(mut self, dmy: bool) -> Self {
        self.config.csv_day_month_year = dmy;
        self
    }

    /// Wrap the notes columns
    pub fn wrap_notes(mut self, wrap: bool) -> Self {
        self.config.wrap_notes = wrap;
        self
    }

    /// Set the notes column width
    pub fn notes_column_width(mut self, width: f64) -> Self {
        self.config.notes_column_width = width;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SheetConfig {
        self.config
    }
}
