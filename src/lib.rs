// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Stackgate
//!
//! Change-set-gated CloudFormation deployments.
//!
//! ## Overview
//!
//! Stackgate turns stack deployments into a two-phase, reviewable workflow:
//!
//! - Deploys produce a CloudFormation change set instead of applying directly
//! - Change sets are waited on, rendered as a table of resource changes, and
//!   executed as an explicit second step
//! - Stack configuration lives in a YAML file (`stackgate.deploy.yaml`)
//!
//! ## Architecture
//!
//! The deployment pipeline runs in three phases around the stack update:
//!
//! 1. **Lock**: the gate suppresses the immediate apply
//! 2. **Apply or suppress**: the engine applies the template unless gated
//! 3. **Unlock**: the gate restores its flag and creates the change set
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`cloudformation`]: CloudFormation API client and domain types
//! - [`changeset`]: Change-set lifecycle (create, wait, present, execute)
//! - [`deploy`]: Deployment gate, engine, and pipeline
//! - [`poll`]: Bounded polling primitive
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! project:
//!   name: my-service
//!   stage: prod
//!   region: us-east-1
//!
//! stack:
//!   template_url: https://s3.amazonaws.com/my-bucket/template.json
//!
//! change_sets:
//!   enabled: true
//!   name: release-42
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod changeset;
pub mod cli;
pub mod cloudformation;
pub mod config;
pub mod deploy;
pub mod error;
pub mod poll;

// ============================================================================
// Re-exports
// ============================================================================

pub use changeset::{ChangeSetController, ChangeSetRunOptions};
pub use cli::{Cli, Commands};
pub use cloudformation::{ChangeSetApi, CloudFormationClient, StackApi};
pub use config::{ConfigParser, ConfigValidator, DeployConfig};
pub use deploy::{DeployGate, DeployPipeline, DirectDeployEngine};
pub use error::{Result, StackgateError};
