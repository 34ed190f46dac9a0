//! Configuration validation for deployment specs.
//!
//! This module validates deployment configurations before any remote call is
//! made, so misconfiguration surfaces immediately with a field path.

use crate::error::{ConfigError, Result, StackgateError};
use tracing::debug;

use super::spec::DeployConfig;

/// CloudFormation limits stack names to 128 characters.
const MAX_STACK_NAME_LEN: usize = 128;

/// Validator for deployment configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a deployment configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self, config: &DeployConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_project(config, &mut result);
        Self::validate_stack(config, &mut result);
        Self::validate_change_sets(config, &mut result);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(StackgateError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Validates project configuration and the derived stack name.
    fn validate_project(config: &DeployConfig, result: &mut ValidationResult) {
        let project = &config.project;

        if project.name.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("project.name"),
                message: String::from("Project name cannot be empty"),
            });
        } else if !is_valid_stack_name(&project.name) {
            result.errors.push(ValidationError {
                field: String::from("project.name"),
                message: format!(
                    "Project name '{}' is invalid. Must start with a letter and contain only \
                     alphanumerics and hyphens.",
                    project.name
                ),
            });
        }

        if project.stage.is_empty() {
            result.errors.push(ValidationError {
                field: String::from("project.stage"),
                message: String::from("Stage cannot be empty"),
            });
        }

        if config.stack_name().len() > MAX_STACK_NAME_LEN {
            result.errors.push(ValidationError {
                field: String::from("project.name"),
                message: format!(
                    "Derived stack name exceeds {MAX_STACK_NAME_LEN} characters"
                ),
            });
        }
    }

    /// Validates stack configuration.
    fn validate_stack(config: &DeployConfig, result: &mut ValidationResult) {
        let stack = &config.stack;

        if !stack.template_url.starts_with("https://") && !stack.template_url.starts_with("s3://") {
            result.errors.push(ValidationError {
                field: String::from("stack.template_url"),
                message: format!(
                    "Template URL '{}' must be an https:// or s3:// location",
                    stack.template_url
                ),
            });
        }

        if let Some(role_arn) = &stack.role_arn {
            if !role_arn.starts_with("arn:") {
                result.errors.push(ValidationError {
                    field: String::from("stack.role_arn"),
                    message: format!("Role ARN '{role_arn}' must start with 'arn:'"),
                });
            }
        }
    }

    /// Validates change-set configuration.
    fn validate_change_sets(config: &DeployConfig, result: &mut ValidationResult) {
        let Some(change_sets) = &config.change_sets else {
            return;
        };

        if let Some(name) = &change_sets.name {
            if !name.is_empty() && !is_valid_stack_name(name) {
                result.errors.push(ValidationError {
                    field: String::from("change_sets.name"),
                    message: format!(
                        "Change-set name '{name}' is invalid. Must start with a letter and \
                         contain only alphanumerics and hyphens."
                    ),
                });
            }
        }

        if !change_sets.enabled && change_sets.name.is_some() {
            result.warnings.push(String::from(
                "change_sets.name is set but change_sets.enabled is false; the name only \
                 applies to explicit execute/print commands",
            ));
        }
    }
}

/// Checks the CloudFormation name rule: a letter followed by alphanumerics
/// and hyphens.
fn is_valid_stack_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}
