//! # LogWriter: events to `tracing`
//!
//! Turns bus events into log lines. Installed by default by
//! [`AutoStopBuilder`](crate::AutoStopBuilder).
//!
//! ## Example output
//! ```text
//! INFO shutdown scheduled generation=1 delay_ms=600000
//! INFO shutdown canceled generation=1
//! INFO shutdown requested generation=2 delay_ms=600000
//! ERROR shutdown command failed generation=2 reason="rejected: busy"
//! WARN subscriber overflow subscriber="metrics" reason="full"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::PlayerJoined => {
                debug!(population = ?e.population, "player joined");
            }
            EventKind::PlayerLeft => {
                debug!(population = ?e.population, "player left");
            }
            EventKind::HostReady => {
                debug!(population = ?e.population, "host ready");
            }
            EventKind::TeardownRequested => {
                info!(reason, "teardown requested");
            }
            EventKind::ShutdownArmed => {
                info!(generation = ?e.generation, delay_ms = ?e.delay_ms, "shutdown scheduled");
            }
            EventKind::ShutdownSuperseded => {
                info!(generation = ?e.generation, "shutdown rescheduled");
            }
            EventKind::ShutdownDisarmed => {
                info!(generation = ?e.generation, "shutdown canceled");
            }
            EventKind::ShutdownFired => {
                info!(generation = ?e.generation, delay_ms = ?e.delay_ms, "shutdown requested");
            }
            EventKind::ShutdownFailed => {
                error!(generation = ?e.generation, reason, "shutdown command failed");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = ?e.source, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(subscriber = ?e.source, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LogBuffer;
    use std::time::Duration;

    #[tokio::test]
    async fn countdown_transitions_are_logged() {
        let logs = LogBuffer::default();
        let _guard = logs.install();
        let writer = LogWriter::new();

        writer
            .on_event(
                &Event::new(EventKind::ShutdownArmed)
                    .with_generation(1)
                    .with_delay(Duration::from_secs(600)),
            )
            .await;
        writer
            .on_event(&Event::new(EventKind::ShutdownDisarmed).with_generation(1))
            .await;

        let out = logs.contents();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{out}");
        assert!(lines[0].contains("INFO") && lines[0].contains("shutdown scheduled"));
        assert!(lines[0].contains("600000"));
        assert!(lines[1].contains("INFO") && lines[1].contains("shutdown canceled"));
    }

    #[tokio::test]
    async fn failed_shutdown_is_an_error_line() {
        let logs = LogBuffer::default();
        let _guard = logs.install();

        LogWriter::new()
            .on_event(
                &Event::new(EventKind::ShutdownFailed)
                    .with_generation(2)
                    .with_reason("rejected: busy"),
            )
            .await;

        let out = logs.contents();
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains("shutdown command failed"), "{out}");
        assert!(out.contains("rejected: busy"), "{out}");
    }
}
