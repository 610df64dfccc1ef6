use serde::{Deserialize, Serialize};

/// Response from the gateway health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Raw status string; `"ok"` means the gateway is ready.
    pub status: String,
}

impl HealthStatus {
    /// Whether the gateway reported itself ready.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
