//! Report assembly and console rendering.
//!
//! A [`Report`] holds one row per processed PR plus the per-size summary. It renders
//! either as aligned plain-text tables or as JSON.

use crate::config::RepoId;
use crate::duration::format_signed;
use crate::metrics::SizeAggregator;
use crate::reviews::ResolvedTimes;
use crate::size::SizeLabel;
use crate::types::PullRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;

const NO_APPROVAL: &str = "no approval found";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One processed pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrRow {
    pub number: u64,
    pub size: SizeLabel,
    pub opened_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub approval_seconds: Option<i64>,
    pub merge_seconds: Option<i64>,
}

impl PrRow {
    /// Builds a row from a PR and its resolved times, if any.
    pub fn new(pr: &PullRequest, size: SizeLabel, times: Option<&ResolvedTimes>) -> Self {
        let approved_at = times.and_then(|times| times.approved_at);
        Self {
            number: pr.number,
            size,
            opened_at: pr.created_at,
            approved_at,
            merged_at: pr.merged_at,
            approval_seconds: times
                .and_then(ResolvedTimes::time_to_approval)
                .map(|delta| delta.num_seconds()),
            merge_seconds: times
                .and_then(ResolvedTimes::time_to_merge)
                .map(|delta| delta.num_seconds()),
        }
    }
}

/// Averages for one size label. Only approved PRs are counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeSummary {
    pub label: SizeLabel,
    pub count: u64,
    pub average_approval_seconds: f64,
    pub average_merge_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub repo: RepoId,
    pub generated_at: DateTime<Utc>,
    pub requested: usize,
    pub pull_requests: Vec<PrRow>,
    pub summary: Vec<SizeSummary>,
}

impl Report {
    /// Builds the report from rows, feeding approved PRs into the size aggregation.
    pub fn from_rows(
        repo: RepoId,
        requested: usize,
        rows: Vec<PrRow>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut approval = SizeAggregator::new();
        let mut merge = SizeAggregator::new();

        for row in &rows {
            if let (Some(approval_seconds), Some(merge_seconds)) =
                (row.approval_seconds, row.merge_seconds)
            {
                approval.record(row.size.clone(), approval_seconds);
                merge.record(row.size.clone(), merge_seconds);
            }
        }

        let summary = approval
            .summaries()
            .into_iter()
            .map(|bucket| SizeSummary {
                average_merge_seconds: merge
                    .bucket(&bucket.label)
                    .map(|b| b.average_seconds())
                    .unwrap_or_default(),
                label: bucket.label,
                count: bucket.count,
                average_approval_seconds: bucket.average_seconds,
            })
            .collect();

        Self {
            repo,
            generated_at,
            requested,
            pull_requests: rows,
            summary,
        }
    }

    pub fn approved_count(&self) -> usize {
        self.pull_requests
            .iter()
            .filter(|row| row.approved_at.is_some())
            .count()
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_table(&self) -> String {
        format!(
            "Merged PRs for {} ({} of {} requested)\n\n{}\n\nTime to approval by size ({} approved)\n\n{}",
            self.repo,
            self.pull_requests.len(),
            self.requested,
            render_pr_rows(&self.pull_requests),
            self.approved_count(),
            render_summary(&self.summary)
        )
    }
}

/// Renders one line per PR. PRs without an approval show a placeholder and their merge date.
pub fn render_pr_rows(rows: &[PrRow]) -> String {
    if rows.is_empty() {
        return "No merged pull requests found.".to_string();
    }

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let (approval, merge) = match (row.approval_seconds, row.merge_seconds) {
                (Some(approval), Some(merge)) => (
                    format_signed(approval as f64),
                    format_signed(merge as f64),
                ),
                _ => (
                    NO_APPROVAL.to_string(),
                    row.merged_at
                        .map(|merged_at| format!("merged {}", merged_at.format(DATE_FORMAT)))
                        .unwrap_or_default(),
                ),
            };
            vec![
                format!("#{}", row.number),
                row.opened_at.format(DATE_FORMAT).to_string(),
                approval,
                merge,
                row.size.to_string(),
            ]
        })
        .collect();

    render_table(&["PR", "Opened", "Approved in", "Merged in", "Size"], &body)
}

/// Renders the per-size summary table.
pub fn render_summary(summary: &[SizeSummary]) -> String {
    if summary.is_empty() {
        return "No approved pull requests found.".to_string();
    }

    let body: Vec<Vec<String>> = summary
        .iter()
        .map(|bucket| {
            vec![
                bucket.label.to_string(),
                bucket.count.to_string(),
                format_signed(bucket.average_approval_seconds),
                format_signed(bucket.average_merge_seconds),
            ]
        })
        .collect();

    render_table(
        &["Size", "PRs", "Avg time to approval", "Avg time to merge"],
        &body,
    )
}

/// Left-aligns every column to its widest cell, separated by two spaces.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }

    lines.join("\n")
}
