use serde::{Deserialize, Serialize};

/// Server-authoritative state of a batch job.
///
/// The client keeps no state machine of its own; it re-reads this value on
/// every poll tick. Unrecognized states deserialize to [`JobState::Other`]
/// and are treated as non-terminal continuations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// Picked up and processing.
    Running,
    /// Finished successfully; a result URL should accompany this state.
    Completed,
    /// Finished unsuccessfully; an error message should accompany this state.
    Failed,
    /// Any state this client does not recognize.
    #[serde(other)]
    Other,
}

impl JobState {
    /// Whether polling stops at this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// One read of a batch job's status URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current job state.
    pub status: JobState,

    /// Download URL for the result file, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    /// Server-supplied failure description, set on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
