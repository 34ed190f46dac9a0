//! Configuration parser for loading deployment configuration.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, Result, StackgateError};
use std::path::Path;
use tracing::{debug, info};

use super::spec::DeployConfig;

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeployConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(StackgateError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            StackgateError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeployConfig> {
        debug!("Parsing YAML configuration");

        let config: DeployConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            StackgateError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Successfully parsed configuration for project: {}",
            config.project.name
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format
    /// `STACKGATE_<SECTION>_<KEY>` (e.g. `STACKGATE_PROJECT_STAGE`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<DeployConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut DeployConfig) {
        if let Ok(name) = std::env::var("STACKGATE_PROJECT_NAME") {
            debug!("Overriding project.name from environment");
            config.project.name = name;
        }

        if let Ok(stage) = std::env::var("STACKGATE_PROJECT_STAGE") {
            debug!("Overriding project.stage from environment");
            config.project.stage = stage;
        }

        if let Ok(region) = std::env::var("STACKGATE_PROJECT_REGION") {
            debug!("Overriding project.region from environment");
            config.project.region = Some(region);
        }

        if let Ok(template_url) = std::env::var("STACKGATE_STACK_TEMPLATE_URL") {
            debug!("Overriding stack.template_url from environment");
            config.stack.template_url = template_url;
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                StackgateError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "stackgate.deploy.yaml",
    "stackgate.deploy.yml",
    "stackgate.yaml",
    "stackgate.yml",
];

/// Finds the configuration file in the current directory or parent directories.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(StackgateError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r"
project:
  name: my-service
stack:
  template_url: https://s3.amazonaws.com/bucket/template.json
";
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(yaml, None).unwrap();

        assert_eq!(config.project.name, "my-service");
        assert_eq!(config.project.stage, "dev");
        assert!(config.change_sets.is_none());
        assert!(!config.change_sets_enabled());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
project:
  name: my-service
  stage: prod
  region: eu-west-1

stack:
  template_url: https://s3.amazonaws.com/bucket/prod/template.json
  role_arn: arn:aws:iam::123456789012:role/deploy
  tags:
    team: platform

change_sets:
  enabled: true
  name: release-42
";
        let parser = ConfigParser::new();
        let config = parser.parse_yaml(yaml, None).unwrap();

        assert_eq!(config.stack_name(), "my-service-prod");
        assert!(config.change_sets_enabled());
        assert_eq!(config.configured_change_set_name(), Some("release-42"));
        assert_eq!(
            config.stack.role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/deploy")
        );
    }

    #[test]
    fn test_unknown_change_set_keys_rejected() {
        let yaml = r"
project:
  name: my-service
stack:
  template_url: https://s3.amazonaws.com/bucket/template.json
change_sets:
  enabled: true
  changeSetName: wrong-key
";
        let parser = ConfigParser::new();
        let result = parser.parse_yaml(yaml, None);
        assert!(matches!(
            result,
            Err(StackgateError::Config(ConfigError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_change_sets_toggle_required_when_section_present() {
        let yaml = r"
project:
  name: my-service
stack:
  template_url: https://s3.amazonaws.com/bucket/template.json
change_sets:
  name: release-42
";
        let parser = ConfigParser::new();
        assert!(parser.parse_yaml(yaml, None).is_err());
    }

    #[test]
    fn test_load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stackgate.deploy.yaml");
        std::fs::write(
            &path,
            "project:\n  name: my-service\nstack:\n  template_url: https://s3.amazonaws.com/b/t.json\n",
        )
        .unwrap();

        let parser = ConfigParser::new();
        let config = parser.load_file(&path).unwrap();
        assert_eq!(config.project.name, "my-service");

        let found = find_config_file(dir.path()).unwrap();
        assert_eq!(found, path);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let parser = ConfigParser::new();
        let result = parser.load_file("/nonexistent/stackgate.deploy.yaml");
        assert!(matches!(
            result,
            Err(StackgateError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
