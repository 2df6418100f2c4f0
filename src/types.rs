use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pull request as seen by the reporting pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other,
}

/// A reviewer's recorded decision on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub pr_number: u64,
    pub state: ReviewState,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReviewEvent {
    pub fn is_approval(&self) -> bool {
        self.state == ReviewState::Approved
    }
}
