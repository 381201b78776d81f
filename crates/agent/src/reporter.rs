//! The reporting loop: measure, post, repeat.

use std::sync::Arc;
use std::time::Duration;

use reportframe_config::AgentConfig;
use reportframe_core::{HeightMessage, ParentChannel};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::layout::ContentProbe;
use crate::strategy::MeasurementStrategy;

/// Measures the content it lives in and posts the height to its parent.
pub struct ReporterAgent {
    probe: Arc<dyn ContentProbe>,
    channel: Arc<dyn ParentChannel>,
    interval: Duration,
}

impl ReporterAgent {
    /// Create an agent reporting every second.
    pub fn new(probe: Arc<dyn ContentProbe>, channel: Arc<dyn ParentChannel>) -> Self {
        Self {
            probe,
            channel,
            interval: Duration::from_secs(1),
        }
    }

    /// Set the reporting cadence after the on-load report.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Build an agent with the cadence from configuration.
    pub fn from_config(
        config: &AgentConfig,
        probe: Arc<dyn ContentProbe>,
        channel: Arc<dyn ParentChannel>,
    ) -> Self {
        Self::new(probe, channel).with_interval(config.interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Measure once and post the result. Returns the posted height.
    pub fn report(&self) -> u32 {
        let snapshot = self.probe.snapshot();
        let (strategy, height) = MeasurementStrategy::measure_snapshot(&snapshot);
        debug!(?strategy, height, "Report height");
        self.channel.post(&HeightMessage::new(height));
        height
    }

    /// Start reporting: once now (the content has loaded), then on every
    /// interval until the returned handle is stopped or dropped.
    ///
    /// Returns `None` without attaching anything when the content is not
    /// inside a frame.
    pub fn spawn(self) -> Option<AgentHandle> {
        if !self.probe.is_embedded() {
            info!("Content is the top-level page, reporter agent not attached");
            return None;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        Some(AgentHandle {
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        self.report();

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Reporter agent stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }
    }
}

/// Controls a running [`ReporterAgent`]. Dropping it stops the agent.
pub struct AgentHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl AgentHandle {
    /// Stop reporting and wait for the loop to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}
