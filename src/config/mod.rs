//! Configuration module for the stackgate deployment system.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `stackgate.deploy.yaml`
//! - Environment and .env overrides
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{find_config_file, ConfigParser, DEFAULT_CONFIG_FILES};
pub use spec::{ChangeSetsConfig, DeployConfig, ProjectConfig, StackConfig};
pub use validator::{ConfigValidator, ValidationResult};
