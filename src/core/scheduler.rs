//! # ShutdownScheduler: at most one pending shutdown.
//!
//! Owns the single outstanding [`DelayedAction`] and exposes [`arm`](ShutdownScheduler::arm)
//! and [`disarm`](ShutdownScheduler::disarm). Both are synchronous and never
//! wait on the timer.
//!
//! ## State machine
//! ```text
//!          arm(d)                         arm(d') (supersede)
//! Idle ───────────► Armed{gen=n} ─────────────────────────► Armed{gen=n+1}
//!  ▲                   │    │
//!  │     disarm()      │    │ delay elapsed
//!  └───────────────────┘    └──► fire(n): clear slot if still gen n
//!                                         └─► host.request_shutdown()
//! ```
//!
//! ## Rules
//! - Every mutation of the slot happens under one `Mutex`; the action's own
//!   lock decides cancel-vs-fire, so the two never disagree.
//! - Lock order is always slot → action. The fire path releases the action
//!   lock before taking the slot lock.
//! - A fire whose generation no longer matches the slot (disarmed or
//!   superseded after it fired) still issues the shutdown: the fire won.
//! - `arm` and `disarm` cancel the outgoing action before releasing the slot
//!   lock, so two actions are never pending at once.
//! - The fire path holds only a `Weak` reference to the slot; dropping the
//!   scheduler drops the pending action, which cancels it.
//! - Timers run on the runtime captured at construction, so `arm` works from
//!   host threads outside Tokio.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::core::delayed::DelayedAction;
use crate::events::{Bus, Event, EventKind};
use crate::host::Host;

/// Observable scheduler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No shutdown pending.
    Idle,
    /// A shutdown is pending.
    Armed {
        /// Arm counter of the pending countdown (starts at 1).
        generation: u64,
        /// When the shutdown fires unless disarmed.
        deadline: Instant,
    },
}

/// The countdown currently owned by the scheduler.
struct Armed {
    generation: u64,
    action: DelayedAction,
}

#[derive(Default)]
struct Slot {
    current: Option<Armed>,
    generation: u64,
}

/// Debounced shutdown scheduler.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct ShutdownScheduler {
    slot: Arc<Mutex<Slot>>,
    host: Arc<dyn Host>,
    bus: Bus,
    runtime: Handle,
}

impl ShutdownScheduler {
    /// Creates an idle scheduler that will call `host.request_shutdown()` on fire.
    ///
    /// Captures the current Tokio runtime; must be called inside one.
    pub fn new(host: Arc<dyn Host>, bus: Bus) -> Self {
        Self::with_handle(host, bus, Handle::current())
    }

    /// Creates an idle scheduler whose countdowns run on `runtime`.
    pub fn with_handle(host: Arc<dyn Host>, bus: Bus, runtime: Handle) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            host,
            bus,
            runtime,
        }
    }

    /// Starts a countdown of `delay`, replacing any pending one.
    ///
    /// Returns the generation of the new countdown. Callable from any thread.
    pub fn arm(&self, delay: Duration) -> u64 {
        let mut slot = self.slot.lock();

        if let Some(prev) = slot.current.take() {
            if prev.action.cancel() {
                self.bus.publish(
                    Event::new(EventKind::ShutdownSuperseded).with_generation(prev.generation),
                );
            }
        }

        slot.generation += 1;
        let generation = slot.generation;
        let on_fire = self.fire_fn(generation, delay);
        let action = DelayedAction::start_on(&self.runtime, delay, on_fire);
        slot.current = Some(Armed { generation, action });

        self.bus.publish(
            Event::new(EventKind::ShutdownArmed)
                .with_generation(generation)
                .with_delay(delay),
        );
        generation
    }

    /// Cancels the pending countdown, if any.
    ///
    /// Idempotent. Returns `true` only when a pending shutdown was prevented;
    /// `false` when idle or when the countdown had already fired.
    pub fn disarm(&self) -> bool {
        let mut slot = self.slot.lock();
        let Some(armed) = slot.current.take() else {
            return false;
        };

        let canceled = armed.action.cancel();
        if canceled {
            self.bus.publish(
                Event::new(EventKind::ShutdownDisarmed).with_generation(armed.generation),
            );
        }
        canceled
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        let slot = self.slot.lock();
        match &slot.current {
            Some(armed) if armed.action.is_pending() => SchedulerState::Armed {
                generation: armed.generation,
                deadline: armed.action.deadline(),
            },
            _ => SchedulerState::Idle,
        }
    }

    /// Returns `true` while a shutdown is pending.
    pub fn is_armed(&self) -> bool {
        matches!(self.state(), SchedulerState::Armed { .. })
    }

    /// Time left before the pending shutdown fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.slot
            .lock()
            .current
            .as_ref()
            .and_then(|armed| armed.action.remaining())
    }

    /// Number of `arm` calls so far.
    pub fn generation(&self) -> u64 {
        self.slot.lock().generation
    }

    /// Builds the callback handed to the [`DelayedAction`] of `generation`.
    fn fire_fn(
        &self,
        generation: u64,
        delay: Duration,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, ()> + Send + 'static {
        let slot = Arc::downgrade(&self.slot);
        let host = Arc::clone(&self.host);
        let bus = self.bus.clone();

        move || Box::pin(fire(slot, host, bus, generation, delay))
    }
}

/// Fire path: return to idle, then issue the shutdown once.
async fn fire(
    slot: Weak<Mutex<Slot>>,
    host: Arc<dyn Host>,
    bus: Bus,
    generation: u64,
    delay: Duration,
) {
    if let Some(slot) = slot.upgrade() {
        let mut slot = slot.lock();
        if slot
            .current
            .as_ref()
            .is_some_and(|armed| armed.generation == generation)
        {
            slot.current = None;
        }
    }

    bus.publish(
        Event::new(EventKind::ShutdownFired)
            .with_generation(generation)
            .with_delay(delay),
    );

    if let Err(err) = host.request_shutdown().await {
        bus.publish(
            Event::new(EventKind::ShutdownFailed)
                .with_generation(generation)
                .with_reason(err.as_message()),
        );
        host.report_error(&err);
    }
}
