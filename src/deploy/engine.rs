//! The immediate-apply deploy engine.
//!
//! This is the path the gate suppresses: a direct create-or-update of the
//! stack from the packaged template, followed by a bounded poll until the
//! stack status settles.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info};

use crate::cloudformation::{is_stack_status_stable, StackApi, StackSettings};
use crate::error::Result;
use crate::poll::{poll_until, PollOptions};

/// Initial delay before the first post-apply status check.
const STATUS_POLL_INITIAL_DELAY: Duration = Duration::from_secs(5);

/// Interval between post-apply status checks.
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Maximum consecutive not-yet-stable observations after an apply (with the
/// 5s interval, half an hour of continuous in-progress status).
const STATUS_POLL_MAX_TRIES: u32 = 360;

/// Additional consecutive stable observations required before the apply is
/// considered settled.
const STATUS_POLL_STABILITY: u32 = 2;

/// The update-stack phase of a deployment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeployEngine: Send + Sync {
    /// Applies the template to the stack immediately.
    async fn apply(&self, settings: &StackSettings) -> Result<()>;
}

/// Deploy engine applying templates directly through CloudFormation.
#[derive(Debug)]
pub struct DirectDeployEngine<S> {
    /// CloudFormation stack API.
    api: S,
}

impl<S: StackApi> DirectDeployEngine<S> {
    /// Creates a new direct deploy engine.
    #[must_use]
    pub const fn new(api: S) -> Self {
        Self { api }
    }

    /// Waits for the stack status to become terminal and stay there.
    async fn wait_for_stable_status(&self, stack_name: &str) -> Result<()> {
        let options = PollOptions::new(format!("stack [{stack_name}] status to stabilize"))
            .with_initial_delay(STATUS_POLL_INITIAL_DELAY)
            .with_interval(STATUS_POLL_INTERVAL)
            .with_max_tries(STATUS_POLL_MAX_TRIES)
            .with_required_consecutive_passes(STATUS_POLL_STABILITY);

        poll_until(
            || async {
                let status = self.api.describe_stack_status(stack_name).await?;
                Ok(status.as_deref().is_some_and(is_stack_status_stable))
            },
            &options,
        )
        .await
    }
}

#[async_trait]
impl<S: StackApi> DeployEngine for DirectDeployEngine<S> {
    async fn apply(&self, settings: &StackSettings) -> Result<()> {
        let stack_name = &settings.stack_name;

        let apply_result = match self.api.describe_stack_status(stack_name).await? {
            Some(status) => {
                info!("Updating stack [{stack_name}] (current status: {status})");
                self.api.update_stack(settings).await
            }
            None => {
                info!("Stack [{stack_name}] does not exist. Creating it...");
                self.api.create_stack(settings).await
            }
        };

        if let Err(err) = apply_result {
            // "No updates are to be performed." is CloudFormation's way of
            // saying the template already matches the stack.
            if err.to_string().contains("No updates are to be performed") {
                info!("Stack [{stack_name}] is already up to date");
                return Ok(());
            }
            error!("Apply failed for stack [{stack_name}]: {err}");
            return Err(err);
        }

        self.wait_for_stable_status(stack_name).await?;
        info!("Stack [{stack_name}] apply complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudformation::MockStackApi;
    use crate::error::CloudFormationError;

    fn settings() -> StackSettings {
        StackSettings {
            stack_name: String::from("my-service-dev"),
            template_url: String::from("https://s3.amazonaws.com/bucket/template.json"),
            tags: Vec::new(),
            role_arn: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_stack_is_updated() {
        let mut api = MockStackApi::new();
        api.expect_describe_stack_status()
            .returning(|_| Ok(Some(String::from("UPDATE_COMPLETE"))));
        api.expect_update_stack().times(1).returning(|_| Ok(()));

        let engine = DirectDeployEngine::new(api);
        engine.apply(&settings()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_stack_is_created() {
        let mut api = MockStackApi::new();
        let mut describes = 0u32;
        api.expect_describe_stack_status().returning(move |_| {
            describes += 1;
            if describes == 1 {
                Ok(None)
            } else {
                Ok(Some(String::from("CREATE_COMPLETE")))
            }
        });
        api.expect_create_stack().times(1).returning(|_| Ok(()));

        let engine = DirectDeployEngine::new(api);
        engine.apply(&settings()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_updates_error_is_not_a_failure() {
        let mut api = MockStackApi::new();
        api.expect_describe_stack_status()
            .times(1)
            .returning(|_| Ok(Some(String::from("UPDATE_COMPLETE"))));
        api.expect_update_stack().times(1).returning(|_| {
            Err(CloudFormationError::api(
                Some(String::from("ValidationError")),
                "No updates are to be performed.",
            )
            .into())
        });

        let engine = DirectDeployEngine::new(api);
        engine.apply(&settings()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_through_transitional_statuses() {
        let mut api = MockStackApi::new();
        let mut describes = 0u32;
        api.expect_describe_stack_status().returning(move |_| {
            describes += 1;
            // First describe drives the update branch; the next two are
            // in-progress observations from the settle poll.
            if describes <= 3 {
                Ok(Some(String::from("UPDATE_IN_PROGRESS")))
            } else {
                Ok(Some(String::from("UPDATE_COMPLETE")))
            }
        });
        api.expect_update_stack().times(1).returning(|_| Ok(()));

        let engine = DirectDeployEngine::new(api);
        engine.apply(&settings()).await.unwrap();
    }
}
