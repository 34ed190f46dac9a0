//! Change-set lifecycle controller.
//!
//! Orchestrates creation (with CREATE/UPDATE auto-detection), waiting,
//! presentation, and execution of change sets. Presentation always happens
//! immediately before execution so the operator's last view matches what is
//! about to be applied; there is no confirmation gate in between.

use chrono::Utc;
use std::io::Write;
use tracing::{error, info};

use crate::cloudformation::{
    ChangeSetApi, ChangeSetDescription, ChangeSetType, CreateChangeSetInput, StackSettings,
};
use crate::error::{ConfigError, Result};

use super::presenter::{render_change_set, PresentOptions};
use super::wait::wait_for_change_set;

/// Options for the execute and print operations.
#[derive(Debug, Clone, Default)]
pub struct ChangeSetRunOptions {
    /// Change-set name; required for execute and print.
    pub change_set_name: Option<String>,
    /// Configured wait time in seconds (floor-enforced to 90).
    pub wait_secs: u64,
    /// Optional table width constraint for presentation.
    pub table_width: Option<usize>,
}

/// Controller for the change-set lifecycle.
#[derive(Debug)]
pub struct ChangeSetController<C> {
    /// CloudFormation change-set API.
    api: C,
    /// Stack settings.
    settings: StackSettings,
}

impl<C: ChangeSetApi> ChangeSetController<C> {
    /// Creates a new controller.
    #[must_use]
    pub const fn new(api: C, settings: StackSettings) -> Self {
        Self { api, settings }
    }

    /// Resolves the final change-set name: the explicit one when present and
    /// non-empty, otherwise `{stack_name}-{epoch_millis}`.
    #[must_use]
    pub fn resolve_change_set_name(&self, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!(
                "{}-{}",
                self.settings.stack_name,
                Utc::now().timestamp_millis()
            ),
        }
    }

    /// Creates a change set against the target stack.
    ///
    /// An UPDATE-typed create is attempted first. If the service reports
    /// that the stack does not exist, a CREATE-typed attempt follows with
    /// the same name (producing a new empty stack as a side effect). Any
    /// other error is logged once and re-raised unchanged.
    ///
    /// Returns the final change-set name.
    ///
    /// # Errors
    ///
    /// Returns any service error other than the discriminated
    /// stack-missing condition.
    pub async fn create_change_set(&self, explicit_name: Option<&str>) -> Result<String> {
        let final_name = self.resolve_change_set_name(explicit_name);
        info!("Creating CloudFormation change set [{final_name}]...");

        let update = self.create_input(&final_name, ChangeSetType::Update);
        match self.api.create_change_set(&update).await {
            Ok(()) => Ok(final_name),
            Err(err) if err.is_stack_missing() => {
                info!(
                    "Stack [{}] does not exist. Creating a new empty stack...",
                    self.settings.stack_name
                );
                let create = self.create_input(&final_name, ChangeSetType::Create);
                self.api.create_change_set(&create).await?;
                Ok(final_name)
            }
            Err(err) => {
                error!("Unrecognized error: {err}");
                Err(err)
            }
        }
    }

    /// Waits for the named change set, presents it, then executes it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ChangeSetNameMissing`] without any remote call
    /// when no name is set; wait and service errors propagate.
    pub async fn execute_change_set<W: Write>(
        &self,
        options: &ChangeSetRunOptions,
        out: &mut W,
    ) -> Result<()> {
        let name = Self::required_name(options)?;
        info!("Executing CloudFormation change set [{name}]...");

        let description = self.wait_and_describe(name, options, out).await?;
        self.api
            .execute_change_set(&self.settings.stack_name, &description.change_set_name)
            .await?;

        info!("Change set [{name}] execution started");
        Ok(())
    }

    /// Waits for the named change set and presents it without executing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ChangeSetNameMissing`] without any remote call
    /// when no name is set; wait and service errors propagate.
    pub async fn print_change_set<W: Write>(
        &self,
        options: &ChangeSetRunOptions,
        out: &mut W,
    ) -> Result<()> {
        let name = Self::required_name(options)?;
        info!("Printing CloudFormation change set [{name}]...");

        self.wait_and_describe(name, options, out).await?;
        Ok(())
    }

    /// Shared wait → describe → render sequence.
    async fn wait_and_describe<W: Write>(
        &self,
        name: &str,
        options: &ChangeSetRunOptions,
        out: &mut W,
    ) -> Result<ChangeSetDescription> {
        wait_for_change_set(&self.api, &self.settings.stack_name, name, options.wait_secs).await?;

        let description = self
            .api
            .describe_change_set(&self.settings.stack_name, name)
            .await?;

        let rendered = render_change_set(
            &description,
            &PresentOptions {
                table_width: options.table_width,
            },
        );
        out.write_all(rendered.as_bytes())?;

        Ok(description)
    }

    fn required_name(options: &ChangeSetRunOptions) -> Result<&str> {
        match options.change_set_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ConfigError::ChangeSetNameMissing.into()),
        }
    }

    fn create_input(&self, change_set_name: &str, change_set_type: ChangeSetType) -> CreateChangeSetInput {
        CreateChangeSetInput {
            stack_name: self.settings.stack_name.clone(),
            change_set_name: change_set_name.to_string(),
            change_set_type,
            template_url: self.settings.template_url.clone(),
            tags: self.settings.tags.clone(),
            role_arn: self.settings.role_arn.clone(),
        }
    }
}
