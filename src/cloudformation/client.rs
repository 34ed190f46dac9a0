//! CloudFormation API client implementation.
//!
//! This module defines the trait seams for the remote service
//! ([`ChangeSetApi`] for change-set operations, [`StackApi`] for the direct
//! stack operations used by the deploy engine) and implements both with the
//! AWS SDK. Retry policy belongs to callers; nothing here retries.

use async_trait::async_trait;
use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, ChangeSetType as SdkChangeSetType, Tag};
use aws_sdk_cloudformation::Client;
use tracing::debug;

use crate::error::{CloudFormationError, Result, StackgateError};

use super::types::{
    ChangeSetDescription, ChangeSetStatus, ChangeSetType, CreateChangeSetInput, ExecutionStatus,
    ResourceChange, StackSettings, StackTag,
};

/// Change-set operations against CloudFormation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeSetApi: Send + Sync {
    /// Creates a change set.
    async fn create_change_set(&self, input: &CreateChangeSetInput) -> Result<()>;

    /// Describes a change set, following pagination until all planned
    /// changes have been collected.
    async fn describe_change_set(
        &self,
        stack_name: &str,
        change_set_name: &str,
    ) -> Result<ChangeSetDescription>;

    /// Executes a change set.
    async fn execute_change_set(&self, stack_name: &str, change_set_name: &str) -> Result<()>;
}

/// Direct stack operations used by the immediate-apply deploy path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Creates a new stack from a template.
    async fn create_stack(&self, settings: &StackSettings) -> Result<()>;

    /// Updates an existing stack from a template.
    async fn update_stack(&self, settings: &StackSettings) -> Result<()>;

    /// Returns the current status string of a stack, or `None` if the stack
    /// does not exist.
    async fn describe_stack_status(&self, stack_name: &str) -> Result<Option<String>>;
}

/// CloudFormation client wrapping the AWS SDK.
#[derive(Debug, Clone)]
pub struct CloudFormationClient {
    /// SDK client.
    client: Client,
}

impl CloudFormationClient {
    /// Creates a new client using the ambient AWS credential chain.
    pub async fn new(region: Option<&str>) -> Self {
        let config = if let Some(region_str) = region {
            aws_config::from_env()
                .region(aws_config::Region::new(region_str.to_string()))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        Self {
            client: Client::new(&config),
        }
    }

    /// Creates a client from an existing SDK client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts crate tags into SDK tags.
    fn sdk_tags(tags: &[StackTag]) -> Vec<Tag> {
        tags.iter()
            .map(|t| Tag::builder().key(&t.key).value(&t.value).build())
            .collect()
    }
}

/// Maps an SDK error into the crate error type, preserving the service error
/// code and message so callers can discriminate on them.
fn map_sdk_error<E>(err: SdkError<E>) -> StackgateError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(context) => {
            let meta = context.err();
            let message = meta
                .message()
                .map_or_else(|| err.to_string(), ToString::to_string);
            CloudFormationError::api(meta.code().map(ToString::to_string), message).into()
        }
        _ => CloudFormationError::network(err.to_string()).into(),
    }
}

#[async_trait]
impl ChangeSetApi for CloudFormationClient {
    async fn create_change_set(&self, input: &CreateChangeSetInput) -> Result<()> {
        debug!(
            "CreateChangeSet [{}] on stack [{}] ({})",
            input.change_set_name, input.stack_name, input.change_set_type
        );

        let change_set_type = match input.change_set_type {
            ChangeSetType::Create => SdkChangeSetType::Create,
            ChangeSetType::Update => SdkChangeSetType::Update,
        };

        self.client
            .create_change_set()
            .stack_name(&input.stack_name)
            .change_set_name(&input.change_set_name)
            .change_set_type(change_set_type)
            .template_url(&input.template_url)
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .set_tags(Some(Self::sdk_tags(&input.tags)))
            .set_role_arn(input.role_arn.clone())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn describe_change_set(
        &self,
        stack_name: &str,
        change_set_name: &str,
    ) -> Result<ChangeSetDescription> {
        debug!("DescribeChangeSet [{change_set_name}] on stack [{stack_name}]");

        let mut changes: Vec<ResourceChange> = Vec::new();
        let mut next_token: Option<String> = None;
        let mut description: Option<ChangeSetDescription> = None;

        loop {
            let output = self
                .client
                .describe_change_set()
                .stack_name(stack_name)
                .change_set_name(change_set_name)
                .set_next_token(next_token.clone())
                .send()
                .await
                .map_err(map_sdk_error)?;

            for change in output.changes() {
                if let Some(rc) = change.resource_change() {
                    changes.push(ResourceChange {
                        action: rc
                            .action()
                            .map_or_else(String::new, |a| a.as_str().to_string()),
                        resource_type: rc.resource_type().unwrap_or_default().to_string(),
                        logical_resource_id: rc
                            .logical_resource_id()
                            .unwrap_or_default()
                            .to_string(),
                    });
                }
            }

            if description.is_none() {
                description = Some(ChangeSetDescription {
                    stack_name: output.stack_name().unwrap_or(stack_name).to_string(),
                    change_set_name: output
                        .change_set_name()
                        .unwrap_or(change_set_name)
                        .to_string(),
                    status: output
                        .status()
                        .map_or(ChangeSetStatus::Unknown(String::new()), |s| {
                            ChangeSetStatus::parse(s.as_str())
                        }),
                    execution_status: output
                        .execution_status()
                        .map_or(ExecutionStatus::Unknown(String::new()), |s| {
                            ExecutionStatus::parse(s.as_str())
                        }),
                    status_reason: output.status_reason().map(ToString::to_string),
                    changes: Vec::new(),
                });
            }

            next_token = output.next_token().map(ToString::to_string);
            if next_token.is_none() {
                break;
            }
        }

        let mut description = description.ok_or_else(|| {
            StackgateError::CloudFormation(CloudFormationError::InvalidResponse {
                message: String::from("DescribeChangeSet returned no data"),
            })
        })?;
        description.changes = changes;

        Ok(description)
    }

    async fn execute_change_set(&self, stack_name: &str, change_set_name: &str) -> Result<()> {
        debug!("ExecuteChangeSet [{change_set_name}] on stack [{stack_name}]");

        self.client
            .execute_change_set()
            .stack_name(stack_name)
            .change_set_name(change_set_name)
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }
}

#[async_trait]
impl StackApi for CloudFormationClient {
    async fn create_stack(&self, settings: &StackSettings) -> Result<()> {
        debug!("CreateStack [{}]", settings.stack_name);

        self.client
            .create_stack()
            .stack_name(&settings.stack_name)
            .template_url(&settings.template_url)
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .set_tags(Some(Self::sdk_tags(&settings.tags)))
            .set_role_arn(settings.role_arn.clone())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn update_stack(&self, settings: &StackSettings) -> Result<()> {
        debug!("UpdateStack [{}]", settings.stack_name);

        self.client
            .update_stack()
            .stack_name(&settings.stack_name)
            .template_url(&settings.template_url)
            .capabilities(Capability::CapabilityIam)
            .capabilities(Capability::CapabilityNamedIam)
            .set_tags(Some(Self::sdk_tags(&settings.tags)))
            .set_role_arn(settings.role_arn.clone())
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(())
    }

    async fn describe_stack_status(&self, stack_name: &str) -> Result<Option<String>> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await;

        match result {
            Ok(output) => Ok(output
                .stacks()
                .first()
                .and_then(|s| s.stack_status())
                .map(|s| s.as_str().to_string())),
            Err(err) => {
                let mapped = map_sdk_error(err);
                if mapped.is_stack_missing() {
                    Ok(None)
                } else {
                    Err(mapped)
                }
            }
        }
    }
}
