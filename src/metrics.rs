use crate::size::SizeLabel;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running totals for one size label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    pub count: u64,
    pub total_seconds: i64,
}

impl Bucket {
    pub fn average_seconds(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_seconds as f64 / self.count as f64
        }
    }
}

/// The public summary for one size label.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BucketSummary {
    pub label: SizeLabel,
    pub count: u64,
    pub total_seconds: i64,
    pub average_seconds: f64,
}

/// Accumulates durations per size label.
///
/// Totals are kept in whole seconds, so the result does not depend on the order in
/// which durations are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeAggregator {
    buckets: BTreeMap<SizeLabel, Bucket>,
}

impl SizeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: SizeLabel, seconds: i64) {
        let bucket = self.buckets.entry(label).or_default();
        bucket.count += 1;
        bucket.total_seconds += seconds;
    }

    pub fn bucket(&self, label: &SizeLabel) -> Option<&Bucket> {
        self.buckets.get(label)
    }

    /// Per-label summaries in report order (see [`SizeLabel`]).
    pub fn summaries(&self) -> Vec<BucketSummary> {
        self.buckets
            .iter()
            .map(|(label, bucket)| BucketSummary {
                label: label.clone(),
                count: bucket.count,
                total_seconds: bucket.total_seconds,
                average_seconds: bucket.average_seconds(),
            })
            .collect()
    }
}

impl Extend<(SizeLabel, i64)> for SizeAggregator {
    fn extend<I: IntoIterator<Item = (SizeLabel, i64)>>(&mut self, iter: I) {
        for (label, seconds) in iter {
            self.record(label, seconds);
        }
    }
}

impl FromIterator<(SizeLabel, i64)> for SizeAggregator {
    fn from_iter<I: IntoIterator<Item = (SizeLabel, i64)>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}
