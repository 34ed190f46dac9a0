//! Change-set lifecycle: creation, waiting, presentation, execution.

mod controller;
mod presenter;
mod wait;

pub use controller::{ChangeSetController, ChangeSetRunOptions};
pub use presenter::{render_change_set, PresentOptions};
pub use wait::{effective_wait_secs, wait_for_change_set, MIN_WAIT_SECS};
