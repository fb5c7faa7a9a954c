//! # autostop
//!
//! **autostop** stops an empty game server after a configurable delay. When the
//! last player leaves, a countdown starts; a player joining before it elapses
//! cancels it. The countdown is a debounced, cancelable delayed action that is
//! safe against concurrent and repeated triggering.
//!
//! ## Architecture
//! ```text
//!   Host (server framework)
//!     │  HostEvent: PlayerJoined / PlayerLeft{population} / Ready / Teardown
//!     ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  AutoStop (runtime)                                           │
//! │   └─► PopulationWatcher ── policy ──► ShutdownScheduler       │
//! │                                        │  arm(delay)          │
//! │                                        │  disarm()            │
//! │                                        ▼                      │
//! │                                  DelayedAction (tokio task)   │
//! │                                        │ delay elapsed        │
//! └────────────────────────────────────────┼──────────────────────┘
//!                                          ▼
//!                               Host::request_shutdown()
//!
//! Every transition ──► Bus (broadcast) ──► SubscriberSet ──► LogWriter, custom ...
//! ```
//!
//! ## Guarantees
//! - At most one shutdown countdown is pending at any time.
//! - `disarm()` is idempotent; once it returns `true` the countdown never fires.
//! - A cancel racing a fire resolves to exactly one of the two.
//! - A failed shutdown command is reported once and never retried.
//!
//! ## Features
//! | Area              | Description                                          | Key types                                  |
//! |-------------------|------------------------------------------------------|--------------------------------------------|
//! | **Countdown**     | One-shot cancelable timer                            | [`DelayedAction`], [`ActionState`]         |
//! | **Scheduling**    | Single pending shutdown, arm/disarm                  | [`ShutdownScheduler`], [`SchedulerState`]  |
//! | **Policy**        | Join/leave/ready/teardown handling                   | [`PopulationWatcher`]                      |
//! | **Host boundary** | Queries, commands and notifications                  | [`Host`], [`HostEvent`]                    |
//! | **Runtime**       | Event loop, OS signals, event delivery               | [`AutoStop`], [`AutoStopBuilder`]          |
//! | **Configuration** | `AutoStop.json` with recovery to defaults            | [`Config`]                                 |
//! | **Subscriber API**| Hook into transitions (logging, alerts)              | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors for config I/O and shutdown             | [`ConfigError`], [`ShutdownError`]         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use autostop::{AutoStop, Config, Host, HostEvent, ShutdownError};
//!
//! struct Server {
//!     online: AtomicUsize,
//! }
//!
//! #[async_trait]
//! impl Host for Server {
//!     fn active_player_count(&self) -> usize {
//!         self.online.load(Ordering::SeqCst)
//!     }
//!
//!     async fn request_shutdown(&self) -> Result<(), ShutdownError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dir = std::env::temp_dir().join("autostop-doc");
//!     let config = Config::load_or_init(Config::file_path(&dir));
//!     let host = Arc::new(Server { online: AtomicUsize::new(0) });
//!
//!     let stop = AutoStop::builder(config, host).with_os_signals(false).build();
//!     let (tx, rx) = tokio::sync::mpsc::channel(16);
//!
//!     tx.send(HostEvent::PlayerLeft { population: 1 }).await.unwrap();
//!     tx.send(HostEvent::PlayerJoined).await.unwrap();
//!     tx.send(HostEvent::Teardown).await.unwrap();
//!     stop.run(rx).await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod host;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_DELAY_MS, FILE_NAME};
pub use crate::core::{
    ActionState, AutoStop, AutoStopBuilder, DelayedAction, PopulationWatcher, SchedulerState,
    ShutdownScheduler,
};
pub use error::{ConfigError, ShutdownError};
pub use events::{Bus, Event, EventKind};
pub use host::{Host, HostEvent};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
