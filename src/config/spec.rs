//! Configuration specification types.
//!
//! This module defines the structs that map to `stackgate.deploy.yaml`. The
//! configuration declares the target stack, the packaged template location,
//! and whether deployments are gated behind change sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cloudformation::{build_stack_tags, StackSettings};

/// The root configuration structure for a stackgate deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployConfig {
    /// Project-level configuration.
    pub project: ProjectConfig,
    /// Stack and template configuration.
    pub stack: StackConfig,
    /// Change-set gating configuration. Absent means deployments apply
    /// immediately.
    #[serde(default)]
    pub change_sets: Option<ChangeSetsConfig>,
}

/// Project-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Unique name for the project.
    pub name: String,
    /// Deployment stage (e.g. "dev", "staging", "prod").
    #[serde(default = "default_stage")]
    pub stage: String,
    /// AWS region; the ambient AWS configuration is used when absent.
    #[serde(default)]
    pub region: Option<String>,
}

/// Stack and template configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackConfig {
    /// Location of the packaged template (https or s3 URL). Packaging and
    /// upload happen outside this tool.
    pub template_url: String,
    /// Additional stack tags, merged after the synthesized STAGE tag.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Optional CloudFormation deployment role ARN.
    #[serde(default)]
    pub role_arn: Option<String>,
}

/// Change-set gating configuration.
///
/// Unknown keys are rejected; `enabled` is required when the section is
/// present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChangeSetsConfig {
    /// Whether deployments are gated behind change sets.
    pub enabled: bool,
    /// Explicit change-set name. Overrides a CLI-passed name for the
    /// execute/print commands; synthesized from the stack name when absent.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_stage() -> String {
    String::from("dev")
}

impl DeployConfig {
    /// Returns the derived stack name: `{project}-{stage}`.
    #[must_use]
    pub fn stack_name(&self) -> String {
        format!("{}-{}", self.project.name, self.project.stage)
    }

    /// Returns true if deployments are gated behind change sets.
    #[must_use]
    pub fn change_sets_enabled(&self) -> bool {
        self.change_sets.as_ref().is_some_and(|cs| cs.enabled)
    }

    /// Returns the configured change-set name, if any.
    #[must_use]
    pub fn configured_change_set_name(&self) -> Option<&str> {
        self.change_sets
            .as_ref()
            .and_then(|cs| cs.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Builds the stack settings used by the controller and the deploy
    /// engine.
    #[must_use]
    pub fn stack_settings(&self) -> StackSettings {
        StackSettings {
            stack_name: self.stack_name(),
            template_url: self.stack.template_url.clone(),
            tags: build_stack_tags(&self.project.stage, &self.stack.tags),
            role_arn: self.stack.role_arn.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig {
            project: ProjectConfig {
                name: String::from("my-service"),
                stage: String::from("prod"),
                region: None,
            },
            stack: StackConfig {
                template_url: String::from("https://s3.amazonaws.com/bucket/template.json"),
                tags: BTreeMap::new(),
                role_arn: None,
            },
            change_sets: None,
        }
    }

    #[test]
    fn test_stack_name_derivation() {
        assert_eq!(config().stack_name(), "my-service-prod");
    }

    #[test]
    fn test_change_sets_disabled_by_default() {
        let config = config();
        assert!(!config.change_sets_enabled());
        assert_eq!(config.configured_change_set_name(), None);
    }

    #[test]
    fn test_empty_configured_name_counts_as_absent() {
        let mut config = config();
        config.change_sets = Some(ChangeSetsConfig {
            enabled: true,
            name: Some(String::new()),
        });
        assert!(config.change_sets_enabled());
        assert_eq!(config.configured_change_set_name(), None);
    }

    #[test]
    fn test_stack_settings_carry_stage_tag() {
        let settings = config().stack_settings();
        assert_eq!(settings.stack_name, "my-service-prod");
        assert_eq!(settings.tags[0].key, "STAGE");
        assert_eq!(settings.tags[0].value, "prod");
    }
}
