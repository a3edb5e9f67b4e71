use async_trait::async_trait;
use rand::Rng;

use super::{HealthCheck, HealthCheckResult};

/// Demonstration check: alive or dead on a coin flip.
///
/// A real check would probe a dependency here, e.g. whether the store
/// behind the default connection string answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHealthCheck;

#[async_trait]
impl HealthCheck for BasicHealthCheck {
    async fn check(&self) -> HealthCheckResult {
        if rand::thread_rng().gen_bool(0.5) {
            HealthCheckResult::healthy("Alive.")
        } else {
            HealthCheckResult::unhealthy("Dead")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    #[tokio::test]
    async fn reports_alive_or_dead_only() {
        for _ in 0..50 {
            let result = BasicHealthCheck.check().await;
            match result.status {
                HealthStatus::Healthy => assert_eq!(result.description.as_deref(), Some("Alive.")),
                HealthStatus::Unhealthy => assert_eq!(result.description.as_deref(), Some("Dead")),
                HealthStatus::Degraded => panic!("basic check never degrades"),
            }
            assert!(result.data.is_empty());
        }
    }
}
