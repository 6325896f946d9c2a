use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signed-in legal aid provider and the offices they act for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub email: String,
    pub office_codes: Vec<String>,
}

impl Provider {
    pub fn new(email: impl Into<String>, office_codes: Vec<String>) -> Self {
        Self {
            email: email.into(),
            office_codes,
        }
    }

    /// Visible when the record belongs to one of the provider's offices, or
    /// has no office yet and was started by this provider.
    pub fn can_see(&self, office_code: Option<&str>, submitter: &str) -> bool {
        match office_code {
            Some(code) => self.office_codes.iter().any(|own| own == code),
            None => self.email == submitter,
        }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hand-off to the app store, consumed by a background worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionJob {
    pub application_id: String,
    pub application_type: &'static str,
    pub payload: Value,
}

pub trait SubmissionQueue: Send + Sync {
    fn enqueue(&self, job: SubmissionJob) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("submission queue is full")]
    Full,
    #[error("submission queue closed")]
    Closed,
}

/// Error tracking sink for failures that are handled but must not go unseen.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static));
}
