//! CloudFormation integration.
//!
//! Contains the domain types for change sets and the client implementation.

mod client;
mod types;

pub use client::{ChangeSetApi, CloudFormationClient, StackApi};
pub use types::{
    build_stack_tags, is_stack_status_stable, ChangeSetDescription, ChangeSetStatus,
    ChangeSetType, CreateChangeSetInput, ExecutionStatus, ResourceChange, StackSettings,
    StackTag, STAGE_TAG_KEY,
};

#[cfg(test)]
pub use client::{MockChangeSetApi, MockStackApi};
