//! The deployment pipeline.
//!
//! Runs a deploy end to end: lock the gate before the stack update phase,
//! hand off to the engine unless the gate suppressed the apply, then unlock
//! the gate afterwards. When change sets are enabled the unlock step creates
//! one in place of the suppressed apply.

use tracing::info;

use crate::changeset::ChangeSetController;
use crate::cloudformation::{ChangeSetApi, StackSettings};
use crate::deploy::engine::DeployEngine;
use crate::deploy::gate::{DeployGate, ProviderFlags};
use crate::error::Result;

/// What a pipeline run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Whether the stack was applied directly.
    pub applied: bool,
    /// Name of the change set created in place of a direct apply, if any.
    pub change_set_name: Option<String>,
}

/// The before-apply / apply / after-apply deployment sequence.
#[derive(Debug)]
pub struct DeployPipeline<E> {
    engine: E,
    settings: StackSettings,
}

impl<E: DeployEngine> DeployPipeline<E> {
    /// Creates a pipeline for the given stack.
    pub const fn new(engine: E, settings: StackSettings) -> Self {
        Self { engine, settings }
    }

    /// Runs the deployment.
    ///
    /// With the gate disabled this is a plain apply. With the gate enabled
    /// the apply is suppressed and a change set is created instead; the
    /// suppression flag is restored even when the run fails partway.
    ///
    /// # Errors
    ///
    /// Returns the engine's or the change-set creation's error.
    pub async fn run<C: ChangeSetApi>(
        &self,
        gate: &mut DeployGate,
        flags: &mut ProviderFlags,
        controller: &ChangeSetController<C>,
    ) -> Result<DeployOutcome> {
        gate.lock(flags);
        let suppressed = flags.suppress_deploy;

        if suppressed {
            info!(
                "Skipping direct apply for stack [{}]",
                self.settings.stack_name
            );
        } else if let Err(err) = self.engine.apply(&self.settings).await {
            gate.restore(flags);
            return Err(err);
        }

        let change_set_name = gate.unlock(flags, controller).await?;

        Ok(DeployOutcome {
            applied: !suppressed,
            change_set_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudformation::MockChangeSetApi;
    use crate::deploy::engine::MockDeployEngine;
    use crate::error::StackgateError;

    fn settings() -> StackSettings {
        StackSettings {
            stack_name: String::from("my-service-dev"),
            template_url: String::from("https://s3.amazonaws.com/bucket/template.json"),
            tags: Vec::new(),
            role_arn: None,
        }
    }

    fn controller(api: MockChangeSetApi) -> ChangeSetController<MockChangeSetApi> {
        ChangeSetController::new(api, settings())
    }

    #[tokio::test]
    async fn test_disabled_gate_applies_directly() {
        let mut engine = MockDeployEngine::new();
        engine.expect_apply().times(1).returning(|_| Ok(()));
        let api = MockChangeSetApi::new();

        let pipeline = DeployPipeline::new(engine, settings());
        let mut gate = DeployGate::new(false, None);
        let mut flags = ProviderFlags::default();

        let outcome = pipeline
            .run(&mut gate, &mut flags, &controller(api))
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.change_set_name, None);
        assert!(!flags.suppress_deploy);
    }

    #[tokio::test]
    async fn test_enabled_gate_suppresses_apply_and_creates_change_set() {
        // The engine must never run when the gate is up.
        let engine = MockDeployEngine::new();
        let mut api = MockChangeSetApi::new();
        api.expect_create_change_set().times(1).returning(|_| Ok(()));

        let pipeline = DeployPipeline::new(engine, settings());
        let mut gate = DeployGate::new(true, Some(String::from("release-42")));
        let mut flags = ProviderFlags::default();

        let outcome = pipeline
            .run(&mut gate, &mut flags, &controller(api))
            .await
            .unwrap();

        assert!(!outcome.applied);
        assert_eq!(outcome.change_set_name, Some(String::from("release-42")));
        assert!(!flags.suppress_deploy);
    }

    #[tokio::test]
    async fn test_engine_failure_restores_suppression_flag() {
        let mut engine = MockDeployEngine::new();
        engine
            .expect_apply()
            .times(1)
            .returning(|_| Err(StackgateError::internal("apply exploded")));
        let api = MockChangeSetApi::new();

        let pipeline = DeployPipeline::new(engine, settings());
        let mut gate = DeployGate::new(false, None);
        let mut flags = ProviderFlags::default();

        let result = pipeline.run(&mut gate, &mut flags, &controller(api)).await;

        assert!(result.is_err());
        assert!(!flags.suppress_deploy);
    }

    #[tokio::test]
    async fn test_change_set_creation_failure_propagates() {
        let engine = MockDeployEngine::new();
        let mut api = MockChangeSetApi::new();
        api.expect_create_change_set()
            .times(1)
            .returning(|_| Err(StackgateError::internal("create exploded")));

        let pipeline = DeployPipeline::new(engine, settings());
        let mut gate = DeployGate::new(true, Some(String::from("release-42")));
        let mut flags = ProviderFlags::default();

        let result = pipeline.run(&mut gate, &mut flags, &controller(api)).await;

        assert!(result.is_err());
        // The unlock restored the flag before attempting the creation.
        assert!(!flags.suppress_deploy);
    }
}
