//! # Event subscribers for the autostop runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Watcher / Scheduler ── publish(Event) ──► Bus ──► AutoStop listener
//!                                                        │
//!                                                        ▼
//!                                                  SubscriberSet::emit
//!                                               ┌────────┴────────┐
//!                                               ▼                 ▼
//!                                          LogWriter          custom ...
//! ```

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
