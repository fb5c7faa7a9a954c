//! Runtime core: countdown, policy and wiring.
//!
//! Internal modules:
//! - [`delayed`]: one-shot cancelable timer;
//! - [`scheduler`]: owns at most one pending shutdown (`arm` / `disarm`);
//! - [`watcher`]: maps host events to scheduler calls;
//! - [`runtime`]: event loop, teardown and event delivery;
//! - [`shutdown`]: OS termination signal handling.

mod builder;
mod delayed;
mod runtime;
mod scheduler;
mod shutdown;
mod watcher;

pub use builder::AutoStopBuilder;
pub use delayed::{ActionState, DelayedAction};
pub use runtime::AutoStop;
pub use scheduler::{SchedulerState, ShutdownScheduler};
pub use watcher::PopulationWatcher;
