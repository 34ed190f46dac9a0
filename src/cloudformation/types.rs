//! CloudFormation domain types.
//!
//! This module defines the crate-owned types used for communication with
//! CloudFormation. SDK payloads are converted into these at the client
//! boundary so the rest of the crate never sees SDK types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag key carrying the deployment stage; always present on created stacks.
pub const STAGE_TAG_KEY: &str = "STAGE";

/// Type of change set to create.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeSetType {
    /// Create a new (empty) stack as a side effect.
    Create,
    /// Diff against an existing stack.
    Update,
}

/// Lifecycle status of a change set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeSetStatus {
    /// Creation has been requested but not started.
    CreatePending,
    /// The service is still computing the change set.
    CreateInProgress,
    /// The change set is fully computed.
    CreateComplete,
    /// Deletion is in progress.
    DeleteInProgress,
    /// Computation failed.
    Failed,
    /// A status this crate does not know about.
    Unknown(String),
}

/// Execution status of a change set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Not yet available for execution.
    Unavailable,
    /// Ready to execute.
    Available,
    /// Execution is in progress.
    ExecuteInProgress,
    /// Execution finished successfully.
    ExecuteComplete,
    /// Execution failed.
    ExecuteFailed,
    /// The change set can no longer be executed.
    Obsolete,
    /// A status this crate does not know about.
    Unknown(String),
}

/// One planned resource change within a change set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceChange {
    /// Action CloudFormation will take (Add, Modify, Remove, ...).
    pub action: String,
    /// Resource type (e.g. `AWS::Lambda::Function`).
    pub resource_type: String,
    /// Logical resource ID within the template.
    pub logical_resource_id: String,
}

/// A described change set, as computed by the service.
///
/// Read-only from this crate's perspective; only CloudFormation mutates it,
/// in response to create/execute calls. The `changes` ordering reflects the
/// service's planned application order and must be preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSetDescription {
    /// Target stack name.
    pub stack_name: String,
    /// Change-set name.
    pub change_set_name: String,
    /// Lifecycle status.
    pub status: ChangeSetStatus,
    /// Execution status.
    pub execution_status: ExecutionStatus,
    /// Reason for the current status, when the service provides one.
    pub status_reason: Option<String>,
    /// Planned resource changes, in application order.
    pub changes: Vec<ResourceChange>,
}

/// A stack-level tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Stack-level settings shared by change-set creation and the direct
/// deploy path.
#[derive(Debug, Clone)]
pub struct StackSettings {
    /// Target stack name.
    pub stack_name: String,
    /// Location of the packaged template (https or s3 URL).
    pub template_url: String,
    /// Tags applied on create/update.
    pub tags: Vec<StackTag>,
    /// Optional deployment role ARN.
    pub role_arn: Option<String>,
}

/// Request to create a change set.
#[derive(Debug, Clone)]
pub struct CreateChangeSetInput {
    /// Target stack name.
    pub stack_name: String,
    /// Name for the new change set.
    pub change_set_name: String,
    /// CREATE or UPDATE.
    pub change_set_type: ChangeSetType,
    /// Location of the packaged template (https or s3 URL).
    pub template_url: String,
    /// Stack tags to apply.
    pub tags: Vec<StackTag>,
    /// Optional deployment role ARN forwarded to the service.
    pub role_arn: Option<String>,
}

impl ChangeSetStatus {
    /// Parses a status string from the service.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "CREATE_PENDING" => Self::CreatePending,
            "CREATE_IN_PROGRESS" => Self::CreateInProgress,
            "CREATE_COMPLETE" => Self::CreateComplete,
            "DELETE_IN_PROGRESS" => Self::DeleteInProgress,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl ExecutionStatus {
    /// Parses an execution status string from the service.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "UNAVAILABLE" => Self::Unavailable,
            "AVAILABLE" => Self::Available,
            "EXECUTE_IN_PROGRESS" => Self::ExecuteInProgress,
            "EXECUTE_COMPLETE" => Self::ExecuteComplete,
            "EXECUTE_FAILED" => Self::ExecuteFailed,
            "OBSOLETE" => Self::Obsolete,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true if the change set is ready to execute.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ChangeSetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
        };
        write!(f, "{value}")
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Unavailable => "UNAVAILABLE",
            Self::Available => "AVAILABLE",
            Self::ExecuteInProgress => "EXECUTE_IN_PROGRESS",
            Self::ExecuteComplete => "EXECUTE_COMPLETE",
            Self::ExecuteFailed => "EXECUTE_FAILED",
            Self::Obsolete => "OBSOLETE",
            Self::Unknown(other) => other,
        };
        write!(f, "{value}")
    }
}

impl std::fmt::Display for ChangeSetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::CreatePending => "CREATE_PENDING",
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::DeleteInProgress => "DELETE_IN_PROGRESS",
            Self::Failed => "FAILED",
            Self::Unknown(other) => other,
        };
        write!(f, "{value}")
    }
}

/// Builds the tag list for a stack: the STAGE tag first, then configured
/// stack tags in key order. A configured tag with the key `STAGE` overwrites
/// the synthesized one (last write wins).
#[must_use]
pub fn build_stack_tags(stage: &str, extra: &BTreeMap<String, String>) -> Vec<StackTag> {
    let mut merged: Vec<StackTag> = vec![StackTag {
        key: STAGE_TAG_KEY.to_string(),
        value: stage.to_string(),
    }];

    for (key, value) in extra {
        if let Some(existing) = merged.iter_mut().find(|t| t.key == *key) {
            existing.value = value.clone();
        } else {
            merged.push(StackTag {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }

    merged
}

/// Returns true if a stack status string is terminal (stable) rather than
/// transitional. CloudFormation terminal statuses all end in `_COMPLETE` or
/// `_FAILED`.
#[must_use]
pub fn is_stack_status_stable(status: &str) -> bool {
    status.ends_with("_COMPLETE") || status.ends_with("_FAILED")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_status_parse_known() {
        assert_eq!(ExecutionStatus::parse("AVAILABLE"), ExecutionStatus::Available);
        assert_eq!(
            ExecutionStatus::parse("EXECUTE_IN_PROGRESS"),
            ExecutionStatus::ExecuteInProgress
        );
        assert!(ExecutionStatus::parse("AVAILABLE").is_available());
        assert!(!ExecutionStatus::parse("UNAVAILABLE").is_available());
    }

    #[test]
    fn test_execution_status_parse_unknown_round_trips() {
        let status = ExecutionStatus::parse("SOMETHING_NEW");
        assert_eq!(status, ExecutionStatus::Unknown(String::from("SOMETHING_NEW")));
        assert_eq!(status.to_string(), "SOMETHING_NEW");
    }

    #[test]
    fn test_change_set_type_display() {
        assert_eq!(ChangeSetType::Create.to_string(), "CREATE");
        assert_eq!(ChangeSetType::Update.to_string(), "UPDATE");
    }

    #[test]
    fn test_stage_tag_always_present() {
        let tags = build_stack_tags("prod", &BTreeMap::new());
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].key, "STAGE");
        assert_eq!(tags[0].value, "prod");
    }

    #[test]
    fn test_configured_tags_appended() {
        let mut extra = BTreeMap::new();
        extra.insert(String::from("team"), String::from("platform"));
        let tags = build_stack_tags("dev", &extra);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].key, "team");
    }

    #[test]
    fn test_configured_stage_tag_wins() {
        let mut extra = BTreeMap::new();
        extra.insert(String::from("STAGE"), String::from("override"));
        let tags = build_stack_tags("dev", &extra);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, "override");
    }

    #[test]
    fn test_stack_status_stability() {
        assert!(is_stack_status_stable("UPDATE_COMPLETE"));
        assert!(is_stack_status_stable("ROLLBACK_FAILED"));
        assert!(!is_stack_status_stable("UPDATE_IN_PROGRESS"));
        assert!(!is_stack_status_stable("REVIEW_IN_PROGRESS"));
    }
}
