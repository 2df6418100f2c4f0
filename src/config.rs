//! Application configuration and environment variable parsing.
//!
//! Settings come from the environment (optionally a `.env` file). `AppConfig` names the
//! repository to report on and controls the sampling window, page sizes and how many
//! review lookups may run at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl RepoId {
    /// Parses an `owner/repo` string.
    pub fn parse(s: &str) -> Option<Self> {
        let (owner, repo) = s.trim().split_once('/')?;
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Owner of the repository to sample.
    #[serde(default)]
    pub repo_owner: String,

    /// Name of the repository to sample.
    #[serde(default)]
    pub repo_name: String,

    /// Only PRs merged within this many trailing days are sampled.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Page size for both PR and review listings. GitHub caps this at 100.
    #[serde(default = "default_per_page")]
    pub per_page: u8,

    /// Optional hard limit on the number of PR listing pages to request.
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Maximum number of PRs whose reviews are fetched at the same time.
    /// Defaults to 1, which processes PRs strictly one after another.
    #[serde(default = "default_review_concurrency")]
    pub review_concurrency: usize,

    /// Prefix that marks a label as a size classification (e.g. "size/").
    #[serde(default = "default_size_label_prefix")]
    pub size_label_prefix: String,

    /// GitHub Personal Access Token sent as the bearer credential.
    pub github_token: Option<String>,
}

fn default_window_days() -> i64 {
    365
}

fn default_per_page() -> u8 {
    100
}

fn default_review_concurrency() -> usize {
    1
}

fn default_size_label_prefix() -> String {
    "size/".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Self>().map(Self::normalized)
    }

    /// Points the configuration at another repository.
    pub fn with_repo(mut self, repo_id: RepoId) -> Self {
        self.repo_owner = repo_id.owner;
        self.repo_name = repo_id.repo;
        self
    }

    /// Checks that a repository has been named and clamps the remaining values.
    pub fn validated(self) -> anyhow::Result<Self> {
        if self.repo_owner.trim().is_empty() || self.repo_name.trim().is_empty() {
            anyhow::bail!("no repository configured: set REPO_OWNER and REPO_NAME or pass --repo");
        }
        Ok(self.normalized())
    }

    pub fn repo_id(&self) -> RepoId {
        RepoId {
            owner: self.repo_owner.clone(),
            repo: self.repo_name.clone(),
        }
    }

    /// The sampling window. Values too large to represent saturate to the maximum duration.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.window_days).unwrap_or(chrono::Duration::MAX)
    }

    /// Clamps values the GitHub API or the pipeline cannot honor.
    pub fn normalized(mut self) -> Self {
        self.per_page = crate::github::clamp_page_size(self.per_page);
        self.review_concurrency = self.review_concurrency.max(1);
        self.window_days = self.window_days.max(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: [&str; 8] = [
        "REPO_OWNER",
        "REPO_NAME",
        "WINDOW_DAYS",
        "PER_PAGE",
        "MAX_PAGES",
        "REVIEW_CONCURRENCY",
        "SIZE_LABEL_PREFIX",
        "GITHUB_TOKEN",
    ];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_vars();
        env::set_var("REPO_OWNER", "owner1");
        env::set_var("REPO_NAME", "repo1");
        env::set_var("WINDOW_DAYS", "30");
        env::set_var("PER_PAGE", "50");
        env::set_var("MAX_PAGES", "5");
        env::set_var("REVIEW_CONCURRENCY", "4");
        env::set_var("SIZE_LABEL_PREFIX", "pr-size:");
        env::set_var("GITHUB_TOKEN", "secret");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.repo_id().to_string(), "owner1/repo1");
        assert_eq!(config.window_days, 30);
        assert_eq!(config.per_page, 50);
        assert_eq!(config.max_pages, Some(5));
        assert_eq!(config.review_concurrency, 4);
        assert_eq!(config.size_label_prefix, "pr-size:");
        assert_eq!(config.github_token.as_deref(), Some("secret"));

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_vars();
        env::set_var("REPO_OWNER", "owner1");
        env::set_var("REPO_NAME", "repo1");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.window_days, 365);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.review_concurrency, 1);
        assert_eq!(config.size_label_prefix, "size/");
        assert!(config.github_token.is_none());

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_clamps_out_of_range_values() {
        clear_vars();
        env::set_var("REPO_OWNER", "owner1");
        env::set_var("REPO_NAME", "repo1");
        env::set_var("PER_PAGE", "250");
        env::set_var("REVIEW_CONCURRENCY", "0");

        let config = AppConfig::from_env().expect("Failed to load config");

        assert_eq!(config.per_page, 100);
        assert_eq!(config.review_concurrency, 1);

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_config_missing_repo() {
        clear_vars();
        let config = AppConfig::from_env().expect("Failed to load config");
        assert!(config.clone().validated().is_err());

        let config = config
            .with_repo(RepoId::parse("owner2/repo2").unwrap())
            .validated()
            .expect("repo override should validate");
        assert_eq!(config.repo_id().to_string(), "owner2/repo2");
    }

    #[test]
    #[serial]
    fn test_config_invalid_number() {
        clear_vars();
        env::set_var("WINDOW_DAYS", "a year");
        let result = AppConfig::from_env();
        assert!(result.is_err());
        clear_vars();
    }

    #[test]
    #[serial]
    fn test_huge_window_does_not_panic() {
        clear_vars();
        env::set_var("REPO_OWNER", "owner1");
        env::set_var("REPO_NAME", "repo1");
        env::set_var("WINDOW_DAYS", "100000000");

        let config = AppConfig::from_env().expect("Failed to load config");
        let now = chrono::Utc::now();
        assert_eq!(config.window(), chrono::Duration::days(100_000_000));
        assert!(now.checked_sub_signed(config.window()).is_none());

        let config = AppConfig {
            window_days: i64::MAX,
            ..config
        };
        assert_eq!(config.window(), chrono::Duration::MAX);

        clear_vars();
    }

    #[test]
    fn test_repo_id_parse() {
        let id = RepoId::parse(" rust-lang/rust ").unwrap();
        assert_eq!(id.owner, "rust-lang");
        assert_eq!(id.repo, "rust");
        assert!(RepoId::parse("no-slash").is_none());
        assert!(RepoId::parse("a/b/c").is_none());
        assert!(RepoId::parse("/repo").is_none());
    }
}
