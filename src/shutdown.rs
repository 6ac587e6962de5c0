use std::time::Duration;
use tracing::{info, warn};

use crate::light::TrafficLightEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C
    Signal,
    /// The configured run time elapsed
    Deadline,
}

/// Graceful shutdown coordinator for a running light
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    deadline: Option<Duration>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Wait for Ctrl-C or the deadline, whichever comes first.
    /// Without a deadline and without signal support this never resolves.
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        let deadline = async {
            match self.deadline {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    info!("Received Ctrl-C, shutting down");
                    ShutdownReason::Signal
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    (&mut deadline).await;
                    ShutdownReason::Deadline
                }
            },
            _ = &mut deadline => {
                info!("Run time elapsed, shutting down");
                ShutdownReason::Deadline
            }
        }
    }

    /// Cancel the engine loops and log final counters.
    pub fn shutdown_engine(engine: &mut TrafficLightEngine) {
        engine.dispose();
        engine.metrics().log_stats();
        info!(engine_id = %engine.engine_id(), "Graceful shutdown completed successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_resolves() {
        let coordinator = ShutdownCoordinator::new().with_deadline(Some(Duration::from_secs(3)));
        let started = tokio::time::Instant::now();
        assert_eq!(coordinator.wait_for_shutdown().await, ShutdownReason::Deadline);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_engine_stops_loops() {
        let mut engine = TrafficLightEngine::with_defaults().unwrap();
        engine.start();
        tokio::time::sleep(Duration::from_millis(200)).await;

        ShutdownCoordinator::shutdown_engine(&mut engine);
        assert!(!engine.is_scheduled());
        assert!(!engine.snapshot().is_playing);
    }
}
