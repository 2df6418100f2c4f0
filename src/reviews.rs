use crate::github::{clamp_page_size, PullRequestSource};
use crate::types::{PullRequest, ReviewEvent};
use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Lifecycle timestamps derived for one merged pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedTimes {
    pub opened_at: DateTime<Utc>,
    /// The latest approval, or `None` when the PR was never approved.
    pub approved_at: Option<DateTime<Utc>>,
    pub merged_at: DateTime<Utc>,
}

impl ResolvedTimes {
    pub fn time_to_approval(&self) -> Option<TimeDelta> {
        self.approved_at.map(|approved_at| approved_at - self.opened_at)
    }

    /// Time from the latest approval to the merge. Negative when a PR was approved after merging.
    pub fn time_to_merge(&self) -> Option<TimeDelta> {
        self.approved_at.map(|approved_at| self.merged_at - approved_at)
    }
}

/// Returns the latest submission time among approving reviews.
///
/// Later approvals supersede earlier ones, e.g. a re-approval after requested changes.
pub fn latest_approval<'a, I>(reviews: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a ReviewEvent>,
{
    reviews
        .into_iter()
        .filter(|review| review.is_approval())
        .filter_map(|review| review.submitted_at)
        .max()
}

/// Fetches every review page for `pr` and resolves its timestamps.
pub async fn resolve_times<S>(source: &S, pr: &PullRequest, per_page: u8) -> Result<ResolvedTimes>
where
    S: PullRequestSource + ?Sized,
{
    let merged_at = pr
        .merged_at
        .ok_or_else(|| anyhow!("PR #{} has not been merged", pr.number))?;

    let per_page = clamp_page_size(per_page);
    let mut approved_at = None;
    let mut page_num = 1;

    loop {
        let page = source.list_reviews(pr.number, page_num, per_page).await?;
        let own_reviews = page.iter().filter(|review| {
            let matches = review.pr_number == pr.number;
            if !matches {
                tracing::warn!(
                    pr = pr.number,
                    other = review.pr_number,
                    "Ignoring review for another PR"
                );
            }
            matches
        });
        approved_at = approved_at.max(latest_approval(own_reviews));

        if page.is_empty() || page.len() < per_page as usize {
            break;
        }
        page_num += 1;
    }

    Ok(ResolvedTimes {
        opened_at: pr.created_at,
        approved_at,
        merged_at,
    })
}

/// Resolves timestamps for `pr`, logging failures instead of returning them.
///
/// A `None` result is treated downstream the same as a PR without an approval.
pub async fn resolve_or_log<S>(source: &S, pr: &PullRequest, per_page: u8) -> Option<ResolvedTimes>
where
    S: PullRequestSource + ?Sized,
{
    match resolve_times(source, pr, per_page).await {
        Ok(times) => Some(times),
        Err(e) => {
            tracing::error!(pr = pr.number, "Error fetching PR #{} reviews: {:#}", pr.number, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewState;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct ReviewPages {
        pages: Vec<Vec<ReviewEvent>>,
        fail: bool,
        requested: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl PullRequestSource for ReviewPages {
        async fn list_closed_pulls(&self, _: u32, _: u8) -> Result<Vec<PullRequest>> {
            Ok(vec![])
        }

        async fn list_reviews(&self, _: u64, page: u32, _: u8) -> Result<Vec<ReviewEvent>> {
            self.requested.lock().unwrap().push(page);
            if self.fail {
                bail!("reviews unavailable");
            }
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn review(state: ReviewState, submitted_at: DateTime<Utc>) -> ReviewEvent {
        ReviewEvent {
            pr_number: 7,
            state,
            submitted_at: Some(submitted_at),
        }
    }

    fn merged_pr() -> PullRequest {
        PullRequest {
            number: 7,
            created_at: at(1, 0),
            merged_at: Some(at(3, 0)),
            labels: vec!["size/S".to_string()],
        }
    }

    #[test]
    fn test_latest_approval_picks_maximum() {
        let reviews = vec![
            review(ReviewState::Approved, at(1, 5)),
            review(ReviewState::ChangesRequested, at(1, 8)),
            review(ReviewState::Approved, at(2, 9)),
            review(ReviewState::Commented, at(2, 23)),
        ];
        assert_eq!(latest_approval(&reviews), Some(at(2, 9)));
    }

    #[test]
    fn test_latest_approval_none_without_approvals() {
        let reviews = vec![
            review(ReviewState::Commented, at(1, 5)),
            ReviewEvent {
                pr_number: 7,
                state: ReviewState::Approved,
                submitted_at: None,
            },
        ];
        assert_eq!(latest_approval(&reviews), None);
    }

    #[tokio::test]
    async fn test_resolve_times_across_pages() {
        let source = ReviewPages {
            pages: vec![
                vec![
                    review(ReviewState::Approved, at(2, 10)),
                    review(ReviewState::Commented, at(2, 11)),
                ],
                vec![review(ReviewState::Approved, at(2, 4))],
            ],
            fail: false,
            requested: Mutex::new(vec![]),
        };

        let times = resolve_times(&source, &merged_pr(), 2).await.unwrap();

        assert_eq!(times.opened_at, at(1, 0));
        assert_eq!(times.approved_at, Some(at(2, 10)));
        assert_eq!(times.merged_at, at(3, 0));
        assert_eq!(times.time_to_approval(), Some(TimeDelta::hours(34)));
        assert_eq!(times.time_to_merge(), Some(TimeDelta::hours(14)));
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_resolve_times_requests_next_page_after_full_page() {
        let source = ReviewPages {
            pages: vec![vec![review(ReviewState::Approved, at(2, 10))]],
            fail: false,
            requested: Mutex::new(vec![]),
        };

        let times = resolve_times(&source, &merged_pr(), 1).await.unwrap();

        assert_eq!(times.approved_at, Some(at(2, 10)));
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_resolve_times_without_approval() {
        let source = ReviewPages {
            pages: vec![vec![review(ReviewState::Commented, at(2, 10))]],
            fail: false,
            requested: Mutex::new(vec![]),
        };

        let times = resolve_times(&source, &merged_pr(), 100).await.unwrap();

        assert_eq!(times.approved_at, None);
        assert_eq!(times.time_to_approval(), None);
        assert_eq!(times.time_to_merge(), None);
    }

    #[tokio::test]
    async fn test_zero_page_size_stops_on_empty_page() {
        let source = ReviewPages {
            pages: vec![],
            fail: false,
            requested: Mutex::new(vec![]),
        };

        let times = resolve_times(&source, &merged_pr(), 0).await.unwrap();

        assert_eq!(times.approved_at, None);
        assert_eq!(*source.requested.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_reviews_for_other_prs_are_ignored() {
        let mut stray = review(ReviewState::Approved, at(2, 20));
        stray.pr_number = 8;
        let source = ReviewPages {
            pages: vec![vec![review(ReviewState::Approved, at(2, 10)), stray]],
            fail: false,
            requested: Mutex::new(vec![]),
        };

        let times = resolve_times(&source, &merged_pr(), 100).await.unwrap();

        assert_eq!(times.approved_at, Some(at(2, 10)));
    }

    #[tokio::test]
    async fn test_unmerged_pr_is_an_error() {
        let source = ReviewPages {
            pages: vec![],
            fail: false,
            requested: Mutex::new(vec![]),
        };
        let mut pr = merged_pr();
        pr.merged_at = None;

        assert!(resolve_times(&source, &pr, 100).await.is_err());
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_or_log_swallows_errors() {
        let source = ReviewPages {
            pages: vec![],
            fail: true,
            requested: Mutex::new(vec![]),
        };

        assert_eq!(resolve_or_log(&source, &merged_pr(), 100).await, None);
    }
}
