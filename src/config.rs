use crate::backend::Implementation;
use crate::cli::{Cli, OutputFormat};
use crate::valid::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub validation: ValidationConfig,
    pub output: OutputConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend name, see [`Implementation`]
    pub implementation: String,
}

/// Validation-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Depth limit for source trees (unbounded when unset)
    pub source_depth: Option<usize>,
    /// Depth limit for section trees (unbounded when unset)
    pub section_depth: Option<usize>,
    /// Exit with failure when a file only has warnings
    pub fail_on_warnings: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            implementation: Implementation::default().to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// The configured backend. Only fails for configs that skipped
    /// [`ConfigManager::validate_config`].
    pub fn implementation(&self) -> Result<Implementation> {
        self.storage
            .implementation
            .parse()
            .map_err(|e: crate::error::ModelError| ConfigError::Validation(e.to_string()))
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::new()
            .with_source_depth(self.validation.source_depth)
            .with_section_depth(self.validation.section_depth)
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment -> CLI
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            let file_config = Self::load_from_file(config_path)?;
            config = Self::merge_configs(config, file_config);
        } else if let Some(found_config) = Self::find_config_file()? {
            config = Self::merge_configs(config, found_config);
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        Self::find_config_file_in(Path::new("."), dirs::config_dir().as_deref())
    }

    /// Search `working_dir`, then `config_dir/nixmodel`
    pub fn find_config_file_in(working_dir: &Path, config_dir: Option<&Path>) -> Result<Option<Config>> {
        let config_names = [
            "nixmodel.toml",
            "nixmodel.json",
            ".nixmodel.toml",
            ".nixmodel.json",
        ];

        let mut search_dirs = vec![working_dir.to_path_buf()];
        if let Some(config_dir) = config_dir {
            search_dirs.push(config_dir.join("nixmodel"));
        }

        for dir in &search_dirs {
            for name in &config_names {
                let path: PathBuf = dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(backend) = env.get("NIXMODEL_BACKEND") {
            config.storage.implementation = backend.trim().to_lowercase();
        }

        if let Some(depth) = env.get("NIXMODEL_SOURCE_DEPTH") {
            config.validation.source_depth = Some(depth.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid NIXMODEL_SOURCE_DEPTH value: {}", depth))
            })?);
        }

        if let Some(depth) = env.get("NIXMODEL_SECTION_DEPTH") {
            config.validation.section_depth = Some(depth.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid NIXMODEL_SECTION_DEPTH value: {}", depth))
            })?);
        }

        if let Some(fail) = env.get("NIXMODEL_FAIL_ON_WARNINGS") {
            config.validation.fail_on_warnings = fail.parse().map_err(|_| {
                ConfigError::Environment(format!(
                    "Invalid NIXMODEL_FAIL_ON_WARNINGS value: {}",
                    fail
                ))
            })?;
        }

        if let Some(verbose) = env.get("NIXMODEL_VERBOSE") {
            config.output.verbose = verbose.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid NIXMODEL_VERBOSE value: {}", verbose))
            })?;
        }

        if let Some(quiet) = env.get("NIXMODEL_QUIET") {
            config.output.quiet = quiet.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid NIXMODEL_QUIET value: {}", quiet))
            })?;
        }

        if let Some(format) = env.get("NIXMODEL_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid NIXMODEL_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(backend) = &cli.backend {
            config.storage.implementation = backend.trim().to_lowercase();
        }

        if cli.source_depth.is_some() {
            config.validation.source_depth = cli.source_depth;
        }
        if cli.section_depth.is_some() {
            config.validation.section_depth = cli.section_depth;
        }
        if cli.fail_on_warnings {
            config.validation.fail_on_warnings = true;
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Merge two configurations (second takes precedence for set values)
    pub fn merge_configs(mut base: Config, override_config: Config) -> Config {
        base.storage.implementation = override_config.storage.implementation;

        if override_config.validation.source_depth.is_some() {
            base.validation.source_depth = override_config.validation.source_depth;
        }
        if override_config.validation.section_depth.is_some() {
            base.validation.section_depth = override_config.validation.section_depth;
        }
        base.validation.fail_on_warnings = override_config.validation.fail_on_warnings;

        base.output.format = override_config.output.format;
        base.output.verbose = override_config.output.verbose;
        base.output.quiet = override_config.output.quiet;

        base
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config
            .storage
            .implementation
            .parse::<Implementation>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Unknown storage implementation '{}', expected one of: {}",
                config.storage.implementation,
                Implementation::NAMES.join(", ")
            )));
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }
}
