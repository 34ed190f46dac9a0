//! Deployment gating around the update-stack phase.
//!
//! When change sets are enabled, the gate suppresses the normal
//! immediate-apply deploy path for the duration of the update-stack phase
//! and produces a change set in its place once the phase completes. The
//! prior flag value is captured at lock time and restored exactly once at
//! unlock time, carried as owned gate state rather than ambient globals.

use tracing::{debug, info};

use crate::changeset::ChangeSetController;
use crate::cloudformation::ChangeSetApi;
use crate::error::Result;

/// Flags read by the deploy engine around its update-stack phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderFlags {
    /// When true, the engine skips its immediate apply.
    pub suppress_deploy: bool,
}

/// Gate state machine: unlocked by default, locked between the before- and
/// after-update-stack signals.
#[derive(Debug)]
pub struct DeployGate {
    /// Whether change-set gating is enabled.
    enabled: bool,
    /// Configured change-set name; synthesized by the controller when
    /// absent.
    change_set_name: Option<String>,
    /// Flag value captured at lock time. `Some` while locked.
    saved_flag: Option<bool>,
}

impl DeployGate {
    /// Creates a new gate.
    #[must_use]
    pub const fn new(enabled: bool, change_set_name: Option<String>) -> Self {
        Self {
            enabled,
            change_set_name,
            saved_flag: None,
        }
    }

    /// Returns true while the gate holds a captured flag value.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.saved_flag.is_some()
    }

    /// Before-update-stack signal: captures the current flag value and
    /// suppresses the immediate apply. No-op when the feature is disabled.
    pub fn lock(&mut self, flags: &mut ProviderFlags) {
        if !self.enabled {
            debug!("Change sets disabled; deploy proceeds unguarded");
            return;
        }

        info!("Change sets are in use. Preventing deploy.");
        self.saved_flag = Some(flags.suppress_deploy);
        flags.suppress_deploy = true;
    }

    /// Restores the flag to its captured value without creating a change
    /// set. Used when the guarded phase fails, so the flag is never left
    /// stuck in the overridden state.
    pub fn restore(&mut self, flags: &mut ProviderFlags) {
        if let Some(saved) = self.saved_flag.take() {
            flags.suppress_deploy = saved;
        }
    }

    /// After-update-stack signal: restores the flag, then creates the
    /// change set that replaces the suppressed apply. No-op when the
    /// feature is disabled.
    ///
    /// Returns the created change-set name, or `None` when disabled.
    ///
    /// # Errors
    ///
    /// Propagates change-set creation failures; the flag is restored
    /// before creation is attempted.
    pub async fn unlock<C: ChangeSetApi>(
        &mut self,
        flags: &mut ProviderFlags,
        controller: &ChangeSetController<C>,
    ) -> Result<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        self.restore(flags);

        let name = controller
            .create_change_set(self.change_set_name.as_deref())
            .await?;
        Ok(Some(name))
    }
}
