//! Artificial latency and failure injection for the demo backend.

use crate::config::Config;
use crate::error::DocsignError;
use rand::Rng;
use std::time::Duration;
use strum_macros::{AsRefStr, Display};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Upload,
    View,
    Signing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub upload_latency: Duration,
    pub view_latency: Duration,
    pub signing_latency: Duration,
    /// Probability that an upload or signing action fails.
    pub failure_rate: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::from_config(&Config::with_defaults())
    }
}

impl Simulation {
    /// No latency and no failures.
    pub fn instant() -> Self {
        Self {
            upload_latency: Duration::ZERO,
            view_latency: Duration::ZERO,
            signing_latency: Duration::ZERO,
            failure_rate: 0.0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let ms = |v: &Option<u64>| Duration::from_millis(v.unwrap_or(0));
        Self {
            upload_latency: ms(config.docsign_upload_latency_ms()),
            view_latency: ms(config.docsign_view_latency_ms()),
            signing_latency: ms(config.docsign_signing_latency_ms()),
            failure_rate: sanitize_rate(config.docsign_failure_rate().unwrap_or(0.0)),
        }
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = sanitize_rate(rate);
        self
    }

    pub fn latency(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Upload => self.upload_latency,
            Operation::View => self.view_latency,
            Operation::Signing => self.signing_latency,
        }
    }

    /// Sleeps for the operation's latency unless `cancel` fires first.
    pub async fn delay(
        &self,
        operation: Operation,
        cancel: &CancellationToken,
    ) -> Result<(), DocsignError> {
        let latency = self.latency(operation);
        if cancel.is_cancelled() {
            return Err(cancelled(operation));
        }
        if latency.is_zero() {
            return Ok(());
        }
        debug!("simulating {} latency of {:?}", operation, latency);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled(operation)),
            _ = tokio::time::sleep(latency) => Ok(()),
        }
    }

    /// Rolls the failure dice for `operation`. Views never fail.
    pub fn check_failure(&self, operation: Operation) -> Result<(), DocsignError> {
        let disabled = self.failure_rate.is_nan() || self.failure_rate <= 0.0;
        if operation == Operation::View || disabled {
            return Ok(());
        }
        if rand::rng().random_bool(self.failure_rate.min(1.0)) {
            debug!("injecting simulated {} failure", operation);
            return Err(DocsignError::SimulatedFailure {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

/// Clamps into `[0.0, 1.0]`; a non-finite rate disables failures.
fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 }
}

fn cancelled(operation: Operation) -> DocsignError {
    DocsignError::Cancelled {
        operation: operation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults() {
        let sim = Simulation::default();
        assert_eq!(sim.upload_latency, Duration::from_millis(1500));
        assert_eq!(sim.view_latency, Duration::from_millis(1000));
        assert_eq!(sim.failure_rate, 0.0);
    }

    #[test]
    fn test_failure_rate_extremes() {
        let always = Simulation::instant().with_failure_rate(1.0);
        assert!(matches!(
            always.check_failure(Operation::Signing),
            Err(DocsignError::SimulatedFailure { .. })
        ));
        assert!(always.check_failure(Operation::View).is_ok());
        assert!(Simulation::instant().check_failure(Operation::Upload).is_ok());
    }

    #[test]
    fn test_non_finite_failure_rate_disables_failures() {
        for rate in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let sim = Simulation::instant().with_failure_rate(rate);
            assert_eq!(sim.failure_rate, 0.0);
            assert!(sim.check_failure(Operation::Signing).is_ok());
        }

        let config = Config::builder().failure_rate(f64::NAN).build();
        let sim = Simulation::from_config(&config);
        assert!(sim.check_failure(Operation::Upload).is_ok());

        let raw = Simulation {
            failure_rate: f64::NAN,
            ..Simulation::instant()
        };
        assert!(raw.check_failure(Operation::Signing).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_waits_for_latency() {
        let sim = Simulation::default();
        let start = tokio::time::Instant::now();
        sim.delay(Operation::Upload, &CancellationToken::new()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_cancelled_midway() {
        let sim = Simulation::default();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let err = sim.delay(Operation::Signing, &cancel).await.unwrap_err();
        assert_eq!(err.to_string(), "The signing operation was cancelled before it completed.");
    }
}
