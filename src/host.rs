//! # Host boundary.
//!
//! The server framework that embeds autostop is modeled by two things:
//! - [`Host`]: the query and command surface (player count, shutdown, error sink);
//! - [`HostEvent`]: the notifications the host delivers (join, leave, ready, teardown).
//!
//! Nothing in this crate depends on a concrete host. Events reach the
//! [`PopulationWatcher`](crate::PopulationWatcher) either through direct calls
//! (`on_player_joined`, ...) or through an `mpsc` channel consumed by
//! [`AutoStop::run`](crate::AutoStop::run).
//!
//! ## Leave ordering contract
//! The population checked on a leave must still include the departing
//! player, so a count of `1` means "the last player is leaving".
//! - Direct callback: [`Host::active_player_count`] is queried inside
//!   `on_player_left`, which the host must call before removing the player.
//! - Channel delivery: the event is handled later, so the host takes the
//!   snapshot itself and sends it in [`HostEvent::PlayerLeft`].

use async_trait::async_trait;

use crate::error::ShutdownError;

/// Notifications delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// A player joined.
    PlayerJoined,
    /// A player is leaving.
    PlayerLeft {
        /// Active player count taken before the player was removed.
        population: usize,
    },
    /// The host finished initialization.
    Ready,
    /// The host process is being torn down.
    Teardown,
}

/// Query and command surface provided by the host.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use async_trait::async_trait;
/// use autostop::{Host, ShutdownError};
///
/// struct Server {
///     online: AtomicUsize,
/// }
///
/// #[async_trait]
/// impl Host for Server {
///     fn active_player_count(&self) -> usize {
///         self.online.load(Ordering::SeqCst)
///     }
///
///     async fn request_shutdown(&self) -> Result<(), ShutdownError> {
///         // stop the server process...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Host: Send + Sync + 'static {
    /// Returns the number of players currently online.
    fn active_player_count(&self) -> usize;

    /// Stops the host process.
    ///
    /// Called at most once per elapsed countdown, from the timer task.
    /// Errors are never retried.
    async fn request_shutdown(&self) -> Result<(), ShutdownError>;

    /// Receives a failed shutdown request.
    ///
    /// The default implementation logs the error.
    fn report_error(&self, err: &ShutdownError) {
        tracing::error!(label = err.as_label(), error = %err, "shutdown request failed");
    }
}
