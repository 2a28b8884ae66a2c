use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
}

/// Liveness response. No dependency checks are performed; the upstream
/// completion API is intentionally not probed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
}

impl HealthCheckResponse {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
        }
    }
}
