use crate::config::RepoId;
use crate::types::{PullRequest, ReviewEvent, ReviewState};
use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::models::pulls::{self, ReviewState as GhReviewState};
use octocrab::params::{self, pulls::Sort};
use octocrab::Octocrab;

/// Read access to the two listings the report needs.
///
/// Pages are 1-based. An empty page means the listing is exhausted.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Lists closed pull requests, most recently updated first.
    async fn list_closed_pulls(&self, page: u32, per_page: u8) -> Result<Vec<PullRequest>>;

    /// Lists the reviews submitted on one pull request.
    async fn list_reviews(&self, number: u64, page: u32, per_page: u8)
        -> Result<Vec<ReviewEvent>>;
}

/// GitHub accepts page sizes between 1 and 100.
pub fn clamp_page_size(per_page: u8) -> u8 {
    per_page.clamp(1, 100)
}

pub struct GitHubClient {
    octocrab: Octocrab,
    repo_id: RepoId,
}

impl GitHubClient {
    pub fn new(repo_id: RepoId, token: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        // Sanitize inputs to prevent path traversal or unintended endpoint access
        let repo_id = RepoId {
            owner: repo_id.owner.trim().replace("..", ""),
            repo: repo_id.repo.trim().replace("..", ""),
        };

        Ok(Self {
            octocrab: builder.build()?,
            repo_id,
        })
    }

    pub fn repo_id(&self) -> &RepoId {
        &self.repo_id
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn list_closed_pulls(&self, page: u32, per_page: u8) -> Result<Vec<PullRequest>> {
        let page = self
            .octocrab
            .pulls(&self.repo_id.owner, &self.repo_id.repo)
            .list()
            .state(params::State::Closed)
            .sort(Sort::Updated)
            .direction(params::Direction::Descending)
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .with_context(|| format!("listing closed pull requests for {}", self.repo_id))?;

        Ok(page.items.into_iter().filter_map(convert_pull).collect())
    }

    async fn list_reviews(
        &self,
        number: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<ReviewEvent>> {
        let page = self
            .octocrab
            .pulls(&self.repo_id.owner, &self.repo_id.repo)
            .list_reviews(number)
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .with_context(|| format!("listing reviews for {}#{}", self.repo_id, number))?;

        Ok(page
            .items
            .into_iter()
            .map(|review| ReviewEvent {
                pr_number: number,
                state: convert_state(review.state),
                submitted_at: review.submitted_at,
            })
            .collect())
    }
}

/// Converts an octocrab pull request into our internal type.
///
/// Entries without a creation timestamp cannot be timed and are dropped.
fn convert_pull(pr: pulls::PullRequest) -> Option<PullRequest> {
    let created_at = pr.created_at?;
    let labels = pr
        .labels
        .unwrap_or_default()
        .into_iter()
        .map(|label| label.name)
        .collect();

    Some(PullRequest {
        number: pr.number,
        created_at,
        merged_at: pr.merged_at,
        labels,
    })
}

fn convert_state(state: Option<GhReviewState>) -> ReviewState {
    match state {
        Some(GhReviewState::Approved) => ReviewState::Approved,
        Some(GhReviewState::ChangesRequested) => ReviewState::ChangesRequested,
        Some(GhReviewState::Commented) => ReviewState::Commented,
        Some(GhReviewState::Dismissed) => ReviewState::Dismissed,
        Some(GhReviewState::Pending) => ReviewState::Pending,
        Some(_) | None => ReviewState::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_state() {
        assert_eq!(
            convert_state(Some(GhReviewState::Approved)),
            ReviewState::Approved
        );
        assert_eq!(
            convert_state(Some(GhReviewState::ChangesRequested)),
            ReviewState::ChangesRequested
        );
        assert_eq!(convert_state(None), ReviewState::Other);
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(0), 1);
        assert_eq!(clamp_page_size(50), 50);
        assert_eq!(clamp_page_size(250), 100);
    }
}
