//! # DelayedAction: one-shot cancelable timer.
//!
//! Runs a callback once after a delay unless canceled first. The wait happens
//! on a task spawned onto a Tokio runtime [`Handle`]; the caller of
//! [`DelayedAction::start_on`] and [`DelayedAction::cancel`] never blocks and
//! need not be a runtime thread.
//!
//! ## States
//! ```text
//!            elapsed, still Pending
//! Pending ─────────────────────────► Fired ──► on_fire().await
//!    │
//!    └── cancel() ─────────────────► Canceled ──► token.cancel() wakes the task, which exits
//! ```
//!
//! ## Rules
//! - `Fired` and `Canceled` are terminal.
//! - The `Pending → terminal` transition is made under one lock, by whichever
//!   side gets there first. The loser observes the terminal state and backs off.
//! - When `cancel()` returns `true`, the callback has not run and never will.
//!   When it returns `false`, the action had already fired (or was canceled).
//! - Dropping the handle cancels a pending action.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a [`DelayedAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionState {
    /// Waiting for the delay to elapse.
    Pending,
    /// The delay elapsed; the callback was started.
    Fired,
    /// Canceled before the delay elapsed.
    Canceled,
}

impl ActionState {
    /// Returns `true` for `Fired` and `Canceled`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionState::Pending)
    }
}

/// Handle to a one-shot timer.
#[must_use = "dropping a DelayedAction cancels it"]
#[derive(Debug)]
pub struct DelayedAction {
    delay: Duration,
    deadline: Instant,
    state: Arc<Mutex<ActionState>>,
    token: CancellationToken,
}

impl DelayedAction {
    /// Schedules `on_fire` on the current runtime.
    ///
    /// Must be called inside a Tokio runtime; see [`start_on`](Self::start_on)
    /// for any other thread.
    pub fn start<F, Fut>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::start_on(&Handle::current(), delay, on_fire)
    }

    /// Schedules `on_fire` to run on `handle` after at least `delay`.
    ///
    /// Returns immediately. Callable from any thread.
    pub fn start_on<F, Fut>(handle: &Handle, delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // deadline is read from the runtime clock, not the caller's
        let _rt = handle.enter();
        let deadline = Instant::now() + delay;
        let state = Arc::new(Mutex::new(ActionState::Pending));
        let token = CancellationToken::new();

        handle.spawn(wait_then_fire(
            deadline,
            Arc::clone(&state),
            token.clone(),
            on_fire,
        ));

        Self {
            delay,
            deadline,
            state,
            token,
        }
    }

    /// Cancels the action if it is still pending.
    ///
    /// Idempotent. Returns `true` only when this call prevented the callback.
    pub fn cancel(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.is_terminal() {
                return false;
            }
            *state = ActionState::Canceled;
        }
        self.token.cancel();
        true
    }

    /// Current state.
    pub fn state(&self) -> ActionState {
        *self.state.lock()
    }

    /// Returns `true` while the callback may still run.
    pub fn is_pending(&self) -> bool {
        self.state() == ActionState::Pending
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Instant at which the action fires if not canceled.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before firing; `None` once terminal.
    pub fn remaining(&self) -> Option<Duration> {
        self.is_pending()
            .then(|| self.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for DelayedAction {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer task body.
async fn wait_then_fire<F, Fut>(
    deadline: Instant,
    state: Arc<Mutex<ActionState>>,
    token: CancellationToken,
    on_fire: F,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::select! {
        _ = time::sleep_until(deadline) => {}
        _ = token.cancelled() => return,
    }

    {
        let mut state = state.lock();
        if *state != ActionState::Pending {
            return;
        }
        *state = ActionState::Fired;
    }
    on_fire().await;
}
