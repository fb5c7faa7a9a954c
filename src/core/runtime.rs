//! # AutoStop: wires the watcher, the scheduler and event delivery.
//!
//! ## High-level architecture
//! ```text
//! Host ── HostEvent (mpsc) ──► AutoStop::run()
//!                                  │
//!                                  ├─► PopulationWatcher::handle(ev)
//!                                  │        └─► ShutdownScheduler::{arm, disarm}
//!                                  │                 └─► DelayedAction ─► Host::request_shutdown()
//!                                  │
//!                                  └─ exit on: HostEvent::Teardown | channel closed | OS signal
//!                                        └─► watcher.on_teardown(reason)   (disarm)
//!                                        └─► close(): drain bus, stop subscriber workers
//!
//! Event flow:
//!   watcher / scheduler ── publish(Event) ──► Bus ──► listener task ──► SubscriberSet::emit
//! ```
//!
//! Hosts that deliver notifications as callbacks can skip [`AutoStop::run`] and
//! call [`AutoStop::watcher`] methods directly, then [`AutoStop::close`].
//! Dropping an `AutoStop` without closing it still stops event delivery, but
//! queued events may be lost.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::builder::AutoStopBuilder;
use super::scheduler::ShutdownScheduler;
use super::shutdown;
use super::watcher::PopulationWatcher;
use crate::{
    config::Config,
    events::Bus,
    host::{Host, HostEvent},
    subscribers::SubscriberSet,
};

/// Running autostop instance.
pub struct AutoStop {
    config: Config,
    bus: Bus,
    scheduler: Arc<ShutdownScheduler>,
    watcher: PopulationWatcher,
    listener: JoinHandle<()>,
    runtime_token: CancellationToken,
    _stop_on_drop: DropGuard,
    os_signals: bool,
}

impl AutoStop {
    /// Starts building a runtime for `host` with `config`.
    pub fn builder(config: Config, host: Arc<dyn Host>) -> AutoStopBuilder {
        AutoStopBuilder::new(config, host)
    }

    pub(super) fn new_internal(
        config: Config,
        bus: Bus,
        subs: SubscriberSet,
        scheduler: Arc<ShutdownScheduler>,
        watcher: PopulationWatcher,
        runtime_token: CancellationToken,
        os_signals: bool,
    ) -> Self {
        let listener = spawn_listener(&bus, subs, runtime_token.clone());
        Self {
            config,
            bus,
            scheduler,
            watcher,
            listener,
            _stop_on_drop: runtime_token.clone().drop_guard(),
            runtime_token,
            os_signals,
        }
    }

    /// The validated configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The event bus; extra receivers see every event published after they subscribe.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The shutdown scheduler.
    pub fn scheduler(&self) -> &Arc<ShutdownScheduler> {
        &self.scheduler
    }

    /// The watcher, for hosts that deliver notifications as direct calls.
    pub fn watcher(&self) -> &PopulationWatcher {
        &self.watcher
    }

    /// Consumes host events until teardown, then releases everything.
    ///
    /// Exits when:
    /// - [`HostEvent::Teardown`] is received,
    /// - every sender of `events` is dropped,
    /// - an OS termination signal arrives (if enabled).
    ///
    /// Every exit disarms any pending shutdown before returning.
    pub async fn run(self, mut events: mpsc::Receiver<HostEvent>) {
        let reason = self.drive(&mut events).await;
        tracing::debug!(reason, "autostop stopping");
        self.watcher.on_teardown(reason);
        self.close().await;
    }

    /// Event loop; returns the teardown reason.
    async fn drive(&self, events: &mut mpsc::Receiver<HostEvent>) -> &'static str {
        let signal = shutdown::wait_for_signal();
        tokio::pin!(signal);
        let mut signals = self.os_signals;

        loop {
            tokio::select! {
                ev = events.recv() => match ev {
                    Some(HostEvent::Teardown) => return "teardown",
                    Some(ev) => {
                        self.watcher.handle(ev);
                    }
                    None => return "events_closed",
                },
                res = &mut signal, if signals => match res {
                    Ok(name) => return name,
                    Err(err) => {
                        tracing::warn!(error = %err, "signal registration failed; ignoring OS signals");
                        signals = false;
                    }
                },
            }
        }
    }

    /// Stops event delivery: flushes pending events to subscribers and waits for their workers.
    ///
    /// Does not disarm; [`run`](Self::run) does that before closing.
    pub async fn close(self) {
        self.runtime_token.cancel();
        if let Err(err) = self.listener.await {
            tracing::warn!(error = %err, "event listener ended abnormally");
        }
    }
}

/// Subscribes to the bus and forwards events to the subscriber set until `token` is cancelled.
fn spawn_listener(bus: &Bus, subs: SubscriberSet, token: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tracing::debug!(subscribers = subs.len(), "event listener starting");

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => subs.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        subs.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShutdownError;
    use crate::events::{Event, EventKind};
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Server {
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl Host for Server {
        fn active_player_count(&self) -> usize {
            0
        }

        async fn request_shutdown(&self) -> Result<(), ShutdownError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().push(ev.kind);
        }
    }

    fn build(server: &Arc<Server>, rec: &Arc<Recorder>) -> AutoStop {
        let config = Config {
            delay: 1000,
            stop_before_first_join: false,
        };
        AutoStop::builder(config, server.clone())
            .with_subscriber(rec.clone())
            .with_os_signals(false)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_event_disarms_and_flushes() {
        let server = Arc::new(Server::default());
        let rec = Arc::new(Recorder::default());
        let stop = build(&server, &rec);
        let scheduler = Arc::clone(stop.scheduler());

        let (tx, rx) = mpsc::channel(8);
        tx.send(HostEvent::PlayerLeft { population: 1 }).await.unwrap();
        tx.send(HostEvent::Teardown).await.unwrap();
        stop.run(rx).await;

        assert!(!scheduler.is_armed());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 0);

        assert_eq!(
            *rec.kinds.lock(),
            vec![
                EventKind::PlayerLeft,
                EventKind::ShutdownArmed,
                EventKind::TeardownRequested,
                EventKind::ShutdownDisarmed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_counts_as_teardown() {
        let server = Arc::new(Server::default());
        let rec = Arc::new(Recorder::default());
        let stop = build(&server, &rec);

        let (tx, rx) = mpsc::channel(8);
        tx.send(HostEvent::PlayerLeft { population: 1 }).await.unwrap();
        drop(tx);
        stop.run(rx).await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 0);
        assert!(rec.kinds.lock().contains(&EventKind::TeardownRequested));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_runtime_stops_subscriber_workers() {
        let server = Arc::new(Server::default());
        let rec = Arc::new(Recorder::default());
        let stop = build(&server, &rec);
        assert_eq!(Arc::strong_count(&rec), 2);

        stop.watcher().on_player_left_with(1);
        drop(stop);
        tokio::time::sleep(Duration::from_millis(200)).await;

        // the worker released its subscriber, and the pending countdown went with the runtime
        assert_eq!(Arc::strong_count(&rec), 1);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn builder_accepts_subscriber_batches() {
        let server = Arc::new(Server::default());
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let stop = AutoStop::builder(
            Config {
                delay: 1000,
                stop_before_first_join: false,
            },
            server,
        )
        .with_subscribers(vec![first.clone() as Arc<dyn Subscribe>, second.clone()])
        .with_bus_capacity(0)
        .without_log_writer()
        .with_os_signals(false)
        .build();

        stop.watcher().on_player_joined();
        stop.close().await;

        assert_eq!(*first.kinds.lock(), vec![EventKind::PlayerJoined]);
        assert_eq!(*second.kinds.lock(), vec![EventKind::PlayerJoined]);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_config_is_validated_on_build() {
        let server = Arc::new(Server::default());
        let stop = AutoStop::builder(
            Config {
                delay: -1,
                stop_before_first_join: true,
            },
            server,
        )
        .without_log_writer()
        .with_os_signals(false)
        .build();

        assert_eq!(stop.config().delay, crate::config::DEFAULT_DELAY_MS);
        stop.close().await;
    }
}
