pub mod config;
pub mod duration;
pub mod fetcher;
pub mod github;
pub mod metrics;
pub mod report;
pub mod reviews;
pub mod size;
pub mod types;

use chrono::{DateTime, Utc};
use config::{AppConfig, RepoId};
use fetcher::FetchOptions;
use futures::stream::{self, StreamExt};
use github::PullRequestSource;
use report::{PrRow, Report};
use size::SizeLabel;

/// The number of merged PRs sampled when no usable count is given.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Settings for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub fetch: FetchOptions,
    pub size_label_prefix: String,
    /// Maximum number of PRs whose reviews are fetched at once. 1 means sequential.
    pub review_concurrency: usize,
}

impl ReportOptions {
    pub fn from_config(config: &AppConfig, sample_size: usize) -> Self {
        Self {
            fetch: FetchOptions {
                target: sample_size,
                window: config.window(),
                per_page: config.per_page,
                max_pages: config.max_pages,
            },
            size_label_prefix: config.size_label_prefix.clone(),
            review_concurrency: config.review_concurrency,
        }
    }
}

/// Interprets the sample size argument from its leading digits, so "5abc" and "2.5"
/// read as 5 and 2.
///
/// Missing, non-numeric and zero values all fall back to [`DEFAULT_SAMPLE_SIZE`].
pub fn parse_sample_size(arg: Option<&str>) -> usize {
    arg.map(|s| {
        let s = s.trim_start();
        let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        &s[..digits]
    })
    .and_then(|digits| digits.parse::<usize>().ok())
    .filter(|&n| n > 0)
    .unwrap_or(DEFAULT_SAMPLE_SIZE)
}

/// Samples merged PRs, resolves their review times and aggregates them by size label.
///
/// Failures while listing PRs or reviews are logged and never abort the run; the
/// report covers whatever could be retrieved.
pub async fn generate_report<S>(
    source: &S,
    repo: RepoId,
    options: &ReportOptions,
    now: DateTime<Utc>,
) -> Report
where
    S: PullRequestSource + ?Sized,
{
    let prs = fetcher::fetch_merged_pull_requests(source, &options.fetch, now).await;
    tracing::info!(repo = %repo, count = prs.len(), "Fetched merged pull requests");

    let per_page = options.fetch.per_page;
    let resolved: Vec<_> = stream::iter(&prs)
        .map(|pr| reviews::resolve_or_log(source, pr, per_page))
        .buffered(options.review_concurrency.max(1))
        .collect()
        .await;

    let rows = prs
        .iter()
        .zip(&resolved)
        .map(|(pr, times)| {
            let size = SizeLabel::from_labels(&pr.labels, &options.size_label_prefix);
            let row = PrRow::new(pr, size, times.as_ref());
            match row.approval_seconds {
                Some(seconds) => {
                    tracing::debug!(pr = pr.number, approval_seconds = seconds, "Resolved approval")
                }
                None => tracing::debug!(pr = pr.number, "No approval found"),
            }
            row
        })
        .collect();

    Report::from_rows(repo, options.fetch.target, rows, now)
}
