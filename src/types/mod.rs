// Public modules
pub mod agent;
pub mod batch_receipt;
pub mod chat_reply;
pub mod chat_request;
pub mod health_status;
pub mod job_status;

// Re-exports
pub use agent::Agent;
pub use batch_receipt::BatchReceipt;
pub use chat_reply::ChatReply;
pub use chat_request::ChatRequest;
pub use health_status::HealthStatus;
pub use job_status::{JobState, JobStatus};
