//! Change event consumer
//!
//! Drives the monitor in a loop, turns every transition into a
//! [`TransceiverEvent`] and publishes it to the configured sinks. Register
//! failures are retried with exponential backoff.

use anyhow::{anyhow, Result};
use sfpmon_core::{RetryConfig, SfpMonError};
use sfpmon_hardware::TransceiverMonitor;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::events::{EventKind, EventSink, TransceiverEvent};

/// Result of a single monitor cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// This many ports changed and were published
    Changed(usize),
    /// The wait timed out with no transitions
    Idle,
    /// The monitor refused the configured timeout
    Rejected,
}

pub struct ChangeEventConsumer {
    monitor: TransceiverMonitor,
    sinks: Vec<Box<dyn EventSink>>,
    retry: RetryConfig,
    check_timeout_ms: i64,
}

impl ChangeEventConsumer {
    pub fn new(
        monitor: TransceiverMonitor,
        sinks: Vec<Box<dyn EventSink>>,
        retry: RetryConfig,
        check_timeout_ms: i64,
    ) -> Self {
        Self {
            monitor,
            sinks,
            retry,
            check_timeout_ms,
        }
    }

    /// Initialize the monitor and publish the ports present at startup
    pub async fn start(&mut self) -> Result<()> {
        let mut failures = 0;
        loop {
            match self.monitor.initialize().await {
                Ok(()) => break,
                Err(e) => {
                    failures += 1;
                    self.backoff(e, failures).await?;
                }
            }
        }

        let present = self.monitor.present_ports();
        if present.is_empty() {
            info!("No transceivers present at startup");
        } else {
            info!("Transceivers present at startup: {:?}", present);
        }

        for port in present {
            self.publish(&TransceiverEvent::new(port, EventKind::Present));
        }
        Ok(())
    }

    /// Wait for one batch of transitions and publish it
    pub async fn run_cycle(&mut self) -> sfpmon_core::Result<CycleOutcome> {
        let outcome = self.monitor.poll(self.check_timeout_ms).await?;

        if !outcome.found {
            return Ok(CycleOutcome::Rejected);
        }
        if outcome.changes.is_empty() {
            debug!("No presence changes");
            return Ok(CycleOutcome::Idle);
        }

        let count = outcome.changes.len();
        for (port, change) in outcome.changes {
            self.publish(&TransceiverEvent::new(port, change.into()));
        }
        Ok(CycleOutcome::Changed(count))
    }

    /// Run cycles until a failure can no longer be retried
    ///
    /// Only returns on error: a rejected timeout, a non-transient error, or
    /// too many consecutive failures.
    pub async fn run_loop(&mut self) -> Result<()> {
        let mut failures = 0;
        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Rejected) => {
                    warn!("Monitor rejected the check, stopping");
                    return Err(anyhow!(
                        "Monitor rejected check timeout of {} ms",
                        self.check_timeout_ms
                    ));
                }
                Ok(outcome) => {
                    if let CycleOutcome::Changed(count) = outcome {
                        debug!("Published {} presence change(s)", count);
                    }
                    if failures > 0 {
                        info!("Monitor recovered after {} failed cycle(s)", failures);
                    }
                    failures = 0;
                }
                Err(e) => {
                    failures += 1;
                    self.backoff(e, failures).await?;
                }
            }
        }
    }

    /// Start the monitor and run the event loop
    pub async fn run(&mut self) -> Result<()> {
        self.start().await?;
        self.run_loop().await
    }

    /// Sleep before the next attempt, or give up
    async fn backoff(&self, err: SfpMonError, failures: u32) -> Result<()> {
        if !err.is_transient() {
            error!("Unrecoverable monitor error: {}", err);
            return Err(anyhow::Error::new(err).context("Unrecoverable monitor error"));
        }

        let limit = self.retry.max_consecutive_failures;
        if limit > 0 && failures >= limit {
            error!("Monitor failed {} times in a row, giving up", failures);
            return Err(anyhow::Error::new(err)
                .context(format!("Giving up after {} consecutive failures", failures)));
        }

        let delay = self.retry.delay_for(failures);
        warn!(
            "Monitor cycle failed ({}), attempt {}; retrying in {:?}",
            err, failures, delay
        );
        sleep(delay).await;
        Ok(())
    }

    fn publish(&mut self, event: &TransceiverEvent) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(event) {
                warn!("Failed to publish event for port {}: {}", event.port, e);
            }
        }
    }
}
