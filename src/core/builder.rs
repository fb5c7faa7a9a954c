use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::runtime::AutoStop;
use super::scheduler::ShutdownScheduler;
use super::watcher::PopulationWatcher;
use crate::{
    config::Config,
    events::Bus,
    host::Host,
    subscribers::{LogWriter, Subscribe, SubscriberSet},
};

/// Builder for constructing an [`AutoStop`] runtime.
pub struct AutoStopBuilder {
    config: Config,
    host: Arc<dyn Host>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
    log_writer: bool,
    os_signals: bool,
}

impl AutoStopBuilder {
    /// Creates a new builder with the given configuration and host.
    pub fn new(config: Config, host: Arc<dyn Host>) -> Self {
        Self {
            config,
            host,
            subscribers: Vec::new(),
            bus_capacity: 1024,
            log_writer: true,
            os_signals: true,
        }
    }

    /// Adds event subscribers (on top of the built-in [`LogWriter`]).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers.extend(subscribers);
        self
    }

    /// Adds a single event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sets the event bus ring buffer size (min 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity.max(1);
        self
    }

    /// Does not install the [`LogWriter`] subscriber.
    pub fn without_log_writer(mut self) -> Self {
        self.log_writer = false;
        self
    }

    /// Enables or disables treating OS termination signals as teardown in
    /// [`AutoStop::run`]. Enabled by default.
    pub fn with_os_signals(mut self, enabled: bool) -> Self {
        self.os_signals = enabled;
        self
    }

    /// Builds the runtime.
    ///
    /// Initializes:
    /// - the event bus and the subscriber workers (fed by a listener task)
    /// - an idle [`ShutdownScheduler`]
    /// - the [`PopulationWatcher`] with the validated configuration
    ///
    /// Must be called inside a Tokio runtime.
    pub fn build(self) -> AutoStop {
        let config = self.config.validated();
        let bus = Bus::new(self.bus_capacity);

        let mut subscribers = self.subscribers;
        if self.log_writer {
            subscribers.insert(0, Arc::new(LogWriter::new()));
        }
        let subs = SubscriberSet::new(subscribers, bus.clone());
        let runtime_token = CancellationToken::new();

        let scheduler = Arc::new(ShutdownScheduler::new(Arc::clone(&self.host), bus.clone()));
        let watcher = PopulationWatcher::new(
            Arc::clone(&scheduler),
            self.host,
            config.clone(),
            bus.clone(),
        );

        AutoStop::new_internal(
            config,
            bus,
            subs,
            scheduler,
            watcher,
            runtime_token,
            self.os_signals,
        )
    }
}
