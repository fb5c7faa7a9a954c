//! # PopulationWatcher: host events to scheduler calls.
//!
//! ## Policy
//! ```text
//! PlayerJoined            ─► disarm()
//! PlayerLeft  (count==1)  ─► arm(config.delay)     last player is leaving
//! PlayerLeft  (count!=1)  ─► nothing
//! Ready (count==0 and StopBeforeFirstJoin) ─► arm(config.delay)
//! Teardown                ─► disarm()
//! ```
//!
//! The leave check relies on the count still including the departing player;
//! see the [`host`](crate::host) module docs for the contract.

use std::sync::Arc;

use crate::config::Config;
use crate::core::scheduler::ShutdownScheduler;
use crate::events::{Bus, Event, EventKind};
use crate::host::{Host, HostEvent};

/// Adapter between host notifications and the [`ShutdownScheduler`].
pub struct PopulationWatcher {
    scheduler: Arc<ShutdownScheduler>,
    host: Arc<dyn Host>,
    config: Config,
    bus: Bus,
}

impl PopulationWatcher {
    /// Creates a watcher applying `config` to `scheduler`.
    pub fn new(
        scheduler: Arc<ShutdownScheduler>,
        host: Arc<dyn Host>,
        config: Config,
        bus: Bus,
    ) -> Self {
        Self {
            scheduler,
            host,
            config,
            bus,
        }
    }

    /// Dispatches one host event.
    ///
    /// Returns `true` when the event changed the scheduler (armed or disarmed).
    pub fn handle(&self, event: HostEvent) -> bool {
        match event {
            HostEvent::PlayerJoined => self.on_player_joined(),
            HostEvent::PlayerLeft { population } => self.on_player_left_with(population),
            HostEvent::Ready => self.on_ready(),
            HostEvent::Teardown => self.on_teardown("teardown"),
        }
    }

    /// A player joined: cancel any pending shutdown.
    pub fn on_player_joined(&self) -> bool {
        self.bus.publish(
            Event::new(EventKind::PlayerJoined).with_population(self.host.active_player_count()),
        );
        self.scheduler.disarm()
    }

    /// A player is leaving; queries the host, which must not have removed them yet.
    pub fn on_player_left(&self) -> bool {
        self.on_player_left_with(self.host.active_player_count())
    }

    /// A player is leaving, with the population snapshot taken by the host.
    pub fn on_player_left_with(&self, population: usize) -> bool {
        self.bus
            .publish(Event::new(EventKind::PlayerLeft).with_population(population));

        if population != 1 {
            return false;
        }
        self.scheduler.arm(self.config.delay());
        true
    }

    /// The host is up: optionally start the countdown for an empty server.
    pub fn on_ready(&self) -> bool {
        let population = self.host.active_player_count();
        self.bus
            .publish(Event::new(EventKind::HostReady).with_population(population));

        if !self.config.stop_before_first_join || population != 0 {
            return false;
        }
        self.scheduler.arm(self.config.delay());
        true
    }

    /// The process is going away: release any pending countdown.
    pub fn on_teardown(&self, reason: &str) -> bool {
        self.bus
            .publish(Event::new(EventKind::TeardownRequested).with_reason(reason));
        self.scheduler.disarm()
    }

    /// The scheduler driven by this watcher.
    pub fn scheduler(&self) -> &Arc<ShutdownScheduler> {
        &self.scheduler
    }

    /// The configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShutdownError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time;

    #[derive(Default)]
    struct Server {
        online: AtomicUsize,
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl Host for Server {
        fn active_player_count(&self) -> usize {
            self.online.load(Ordering::SeqCst)
        }

        async fn request_shutdown(&self) -> Result<(), ShutdownError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn watcher(server: &Arc<Server>, config: Config) -> PopulationWatcher {
        let bus = Bus::new(64);
        let host: Arc<dyn Host> = server.clone();
        let scheduler = Arc::new(ShutdownScheduler::new(Arc::clone(&host), bus.clone()));
        PopulationWatcher::new(scheduler, host, config, bus)
    }

    fn config(delay: i64, stop_before_first_join: bool) -> Config {
        Config {
            delay,
            stop_before_first_join,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn last_leave_arms() {
        let server = Arc::new(Server::default());
        server.online.store(1, Ordering::SeqCst);
        let w = watcher(&server, config(1000, false));

        assert!(w.on_player_left());
        assert!(w.scheduler().is_armed());
        assert_eq!(w.scheduler().remaining(), Some(Duration::from_millis(1000)));
    }

    #[tokio::test(start_paused = true)]
    async fn non_last_leave_does_nothing() {
        let server = Arc::new(Server::default());
        server.online.store(3, Ordering::SeqCst);
        let w = watcher(&server, config(1000, false));

        assert!(!w.on_player_left());
        assert!(!w.handle(HostEvent::PlayerLeft { population: 0 }));
        assert!(!w.scheduler().is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn join_disarms() {
        let server = Arc::new(Server::default());
        let w = watcher(&server, config(1000, false));

        assert!(w.handle(HostEvent::PlayerLeft { population: 1 }));
        server.online.store(1, Ordering::SeqCst);
        assert!(w.handle(HostEvent::PlayerJoined));
        assert!(!w.scheduler().is_armed());

        // nothing pending: join is still safe
        assert!(!w.on_player_joined());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ready_arms_only_when_enabled_and_empty() {
        let server = Arc::new(Server::default());

        assert!(!watcher(&server, config(1000, false)).on_ready());

        let w = watcher(&server, config(1000, true));
        assert!(w.handle(HostEvent::Ready));
        assert!(w.scheduler().is_armed());

        server.online.store(2, Ordering::SeqCst);
        assert!(!watcher(&server, config(1000, true)).on_ready());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn callbacks_from_host_thread_arm_and_fire() {
        let server = Arc::new(Server::default());
        server.online.store(1, Ordering::SeqCst);
        let w = watcher(&server, config(50, false));

        // the host's own dispatch thread, not a runtime worker
        let w = std::thread::spawn(move || {
            assert!(w.on_player_left());
            w
        })
        .join()
        .unwrap();
        assert!(w.scheduler().is_armed());

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 1);
        assert!(!w.scheduler().is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_releases_pending() {
        let server = Arc::new(Server::default());
        let w = watcher(&server, config(1000, true));

        w.on_ready();
        assert!(w.handle(HostEvent::Teardown));
        assert!(!w.on_teardown("again"));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(server.shutdowns.load(Ordering::SeqCst), 0);
    }
}
