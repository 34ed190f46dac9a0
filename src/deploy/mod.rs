//! Deployment orchestration: the gate, the engine, and the pipeline that
//! sequences them.

mod engine;
mod gate;
mod pipeline;

pub use engine::{DeployEngine, DirectDeployEngine};
pub use gate::{DeployGate, ProviderFlags};
pub use pipeline::{DeployOutcome, DeployPipeline};

#[cfg(test)]
pub use engine::MockDeployEngine;
