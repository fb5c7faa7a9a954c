//! # Subscribe: hooks on countdown transitions.
//!
//! Anything that should react to autostop activity (an admin alert before the
//! server stops, an audit trail of cancelled countdowns) implements
//! [`Subscribe`] and is handed to
//! [`AutoStopBuilder::with_subscriber`](crate::AutoStopBuilder::with_subscriber).
//!
//! Delivery goes through [`SubscriberSet`](crate::SubscriberSet): every
//! subscriber has its own bounded queue and worker, so a stalled webhook never
//! delays the countdown or the other subscribers. A full queue loses the event
//! for that subscriber only.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use autostop::{Event, EventKind, Subscribe};
//!
//! struct AdminNotice;
//!
//! #[async_trait]
//! impl Subscribe for AdminNotice {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ShutdownArmed {
//!             let minutes = ev.delay_ms.unwrap_or_default() / 60_000;
//!             println!("server empty, stopping in {minutes} min");
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "admin-notice"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of runtime [`Event`]s.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, in publish order.
    ///
    /// Runs on the subscriber's worker task. A panic is caught and republished
    /// as `EventKind::SubscriberPanicked`; the worker keeps going.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length before events are dropped (at least 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    #[async_trait]
    impl Subscribe for Quiet {
        async fn on_event(&self, _event: &Event) {}
    }

    #[test]
    fn defaults_name_by_type() {
        assert!(Quiet.name().ends_with("Quiet"));
        assert_eq!(Quiet.queue_capacity(), 1024);
    }
}
