use crate::github::{clamp_page_size, PullRequestSource};
use crate::types::PullRequest;
use chrono::{DateTime, Duration, Utc};

/// Controls how merged pull requests are sampled.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// How many merged PRs to collect.
    pub target: usize,
    /// Only PRs merged within this trailing window are kept. A window reaching past the
    /// earliest representable date keeps every merged PR.
    pub window: Duration,
    pub per_page: u8,
    /// Optional cap on the number of listing pages requested.
    pub max_pages: Option<u32>,
}

/// Collects up to `options.target` merged pull requests, most recently updated first.
///
/// Stops early when a page comes back empty. A listing error is logged and the PRs
/// gathered so far are returned, so callers must be prepared for a short or empty list.
pub async fn fetch_merged_pull_requests<S>(
    source: &S,
    options: &FetchOptions,
    now: DateTime<Utc>,
) -> Vec<PullRequest>
where
    S: PullRequestSource + ?Sized,
{
    let cutoff_date = now.checked_sub_signed(options.window);
    let per_page = clamp_page_size(options.per_page);
    let mut merged = Vec::new();
    let mut page_num = 1;

    while merged.len() < options.target {
        if options.max_pages.is_some_and(|max| page_num > max) {
            tracing::warn!(
                "Hit max_pages ({}) after collecting {} of {} merged PRs. Data may be incomplete.",
                page_num - 1,
                merged.len(),
                options.target
            );
            break;
        }

        let page = match source.list_closed_pulls(page_num, per_page).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(page = page_num, "Error fetching merged PRs: {:#}", e);
                break;
            }
        };

        if page.is_empty() {
            tracing::debug!(page = page_num, "Reached the end of the closed PR listing");
            break;
        }

        let remaining = options.target - merged.len();
        merged.extend(
            page.into_iter()
                .filter(|pr| is_merged_since(pr, cutoff_date))
                .take(remaining),
        );

        tracing::debug!(page = page_num, collected = merged.len(), "Processed PR page");
        page_num += 1;
    }

    merged
}

fn is_merged_since(pr: &PullRequest, cutoff_date: Option<DateTime<Utc>>) -> bool {
    pr.merged_at
        .is_some_and(|merged_at| cutoff_date.map_or(true, |cutoff| merged_at >= cutoff))
}
