use serde::{Deserialize, Serialize};

/// Receipt returned by a successful batch submission.
///
/// The status URL may be origin-relative; [`crate::Gateway`] resolves it
/// against its base URL when polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReceipt {
    /// URL to poll for the job's status.
    pub status_url: String,

    /// Server-assigned job identifier, if provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}
