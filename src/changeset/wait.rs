//! Waiting for a change set to become executable.
//!
//! CloudFormation computes change sets asynchronously; after creation the
//! execution status moves from `UNAVAILABLE` to `AVAILABLE` once the delta
//! has been computed. This module polls the description on a fixed
//! one-second interval until that happens or a deadline elapses.

use std::time::Duration;
use tracing::info;

use crate::cloudformation::ChangeSetApi;
use crate::error::{Result, WaitError};

/// Minimum effective wait in seconds. A smaller configured value is raised
/// to this floor.
pub const MIN_WAIT_SECS: u64 = 90;

/// Interval between description polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Returns the effective wait deadline for a configured wait time.
#[must_use]
pub const fn effective_wait_secs(configured: u64) -> u64 {
    if configured < MIN_WAIT_SECS {
        MIN_WAIT_SECS
    } else {
        configured
    }
}

/// Waits until the change set's execution status is `AVAILABLE`.
///
/// Polls `DescribeChangeSet` once per second. Describe failures propagate
/// immediately and abort the wait.
///
/// # Errors
///
/// Returns [`WaitError::NotReady`] with the last observed execution status
/// if the deadline elapses first.
pub async fn wait_for_change_set(
    api: &dyn ChangeSetApi,
    stack_name: &str,
    change_set_name: &str,
    wait_secs: u64,
) -> Result<()> {
    let max_secs = effective_wait_secs(wait_secs);
    let mut last_status = String::new();

    for elapsed in 0..max_secs {
        let description = api.describe_change_set(stack_name, change_set_name).await?;

        if description.execution_status.is_available() {
            info!("ExecutionStatus: {}", description.execution_status);
            return Ok(());
        }

        last_status = description.execution_status.to_string();
        info!("ExecutionStatus: {last_status}.. Elapsed {elapsed} seconds (from max {max_secs})");

        tokio::time::sleep(POLL_INTERVAL).await;
    }

    Err(WaitError::NotReady {
        change_set_name: change_set_name.to_string(),
        last_status,
        waited_secs: max_secs,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudformation::{
        ChangeSetDescription, ChangeSetStatus, ExecutionStatus, MockChangeSetApi,
    };
    use crate::error::StackgateError;

    fn description(execution_status: ExecutionStatus) -> ChangeSetDescription {
        ChangeSetDescription {
            stack_name: String::from("my-service-dev"),
            change_set_name: String::from("my-change-set"),
            status: ChangeSetStatus::CreateComplete,
            execution_status,
            status_reason: None,
            changes: Vec::new(),
        }
    }

    #[test]
    fn test_wait_floor_enforced() {
        assert_eq!(effective_wait_secs(0), 90);
        assert_eq!(effective_wait_secs(40), 90);
        assert_eq!(effective_wait_secs(90), 90);
        assert_eq!(effective_wait_secs(300), 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_immediately_when_available() {
        let mut api = MockChangeSetApi::new();
        api.expect_describe_change_set()
            .times(1)
            .returning(|_, _| Ok(description(ExecutionStatus::Available)));

        let result = wait_for_change_set(&api, "my-service-dev", "my-change-set", 90).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_available() {
        let mut api = MockChangeSetApi::new();
        let mut calls = 0u32;
        api.expect_describe_change_set().returning(move |_, _| {
            calls += 1;
            if calls < 5 {
                Ok(description(ExecutionStatus::Unavailable))
            } else {
                Ok(description(ExecutionStatus::Available))
            }
        });

        let result = wait_for_change_set(&api, "my-service-dev", "my-change-set", 90).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_status() {
        let mut api = MockChangeSetApi::new();
        api.expect_describe_change_set()
            .times(90)
            .returning(|_, _| Ok(description(ExecutionStatus::Unavailable)));

        let result = wait_for_change_set(&api, "my-service-dev", "my-change-set", 10).await;

        match result {
            Err(StackgateError::Wait(WaitError::NotReady {
                last_status,
                waited_secs,
                ..
            })) => {
                assert_eq!(last_status, "UNAVAILABLE");
                assert_eq!(waited_secs, 90);
            }
            other => panic!("expected not-ready error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_describe_error_aborts_wait() {
        let mut api = MockChangeSetApi::new();
        api.expect_describe_change_set()
            .times(1)
            .returning(|_, _| Err(StackgateError::internal("network down")));

        let result = wait_for_change_set(&api, "my-service-dev", "my-change-set", 90).await;
        assert!(matches!(result, Err(StackgateError::Internal(_))));
    }
}
