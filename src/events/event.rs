//! # Runtime events emitted by the watcher and the scheduler.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Host events**: what the watcher received (join, leave, ready, teardown)
//! - **Scheduler events**: countdown transitions (armed, superseded, disarmed, fired, failed)
//! - **Subscriber events**: delivery problems inside the fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! countdown length, the observed population and the arm generation.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use autostop::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ShutdownArmed)
//!     .with_generation(3)
//!     .with_delay(Duration::from_secs(600));
//!
//! assert_eq!(ev.kind, EventKind::ShutdownArmed);
//! assert_eq!(ev.delay_ms, Some(600_000));
//! assert_eq!(ev.generation, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Host events ===
    /// A player joined the server.
    ///
    /// Sets:
    /// - `population`: active player count at the time of the event
    PlayerJoined,

    /// A player is leaving the server.
    ///
    /// Sets:
    /// - `population`: active player count, still including the leaving player
    PlayerLeft,

    /// The host finished initialization.
    ///
    /// Sets:
    /// - `population`: active player count at startup
    HostReady,

    /// The host process is tearing down (teardown event, channel closed or OS signal).
    ///
    /// Sets:
    /// - `reason`: what triggered the teardown
    TeardownRequested,

    // === Scheduler events ===
    /// A shutdown countdown started.
    ///
    /// Sets:
    /// - `generation`: arm counter identifying this countdown
    /// - `delay_ms`: countdown length
    ShutdownArmed,

    /// A pending countdown was replaced by a newer `arm`.
    ///
    /// Sets:
    /// - `generation`: the countdown that was canceled
    ShutdownSuperseded,

    /// A pending countdown was canceled by `disarm`.
    ///
    /// Sets:
    /// - `generation`: the countdown that was canceled
    ShutdownDisarmed,

    /// A countdown elapsed and the shutdown command was issued.
    ///
    /// Sets:
    /// - `generation`: the countdown that fired
    /// - `delay_ms`: countdown length
    ShutdownFired,

    /// The host reported an error for the shutdown command. Not retried.
    ///
    /// Sets:
    /// - `generation`: the countdown that fired
    /// - `reason`: host error message
    ShutdownFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Countdown length in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Active player count observed with the event.
    pub population: Option<usize>,
    /// Arm counter of the countdown this event refers to.
    pub generation: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Name of the emitting component, if applicable.
    pub source: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            delay_ms: None,
            population: None,
            generation: None,
            reason: None,
            source: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting component name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a countdown length (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the observed population.
    #[inline]
    pub fn with_population(mut self, n: usize) -> Self {
        self.population = Some(n);
        self
    }

    /// Attaches the arm generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }
}
