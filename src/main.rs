use anyhow::Context;
use clap::Parser;
use pr_approval_stats::config::{AppConfig, RepoId};
use pr_approval_stats::github::GitHubClient;
use pr_approval_stats::report::OutputFormat;
use pr_approval_stats::{generate_report, parse_sample_size, ReportOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pr-approval-stats", version)]
#[command(about = "Time-to-approval and time-to-merge of merged PRs, grouped by size label")]
struct Cli {
    /// Number of merged PRs to sample (defaults to 100)
    #[arg(allow_hyphen_values = true)]
    count: Option<String>,

    /// Repository as owner/repo (overrides REPO_OWNER and REPO_NAME)
    #[arg(short, long)]
    repo: Option<String>,

    /// Only sample PRs merged within this many days (overrides WINDOW_DAYS)
    #[arg(long)]
    window_days: Option<i64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing (logging). Stdout is reserved for the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_approval_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}. Exiting.", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        tracing::error!("Error in report run: {:#}", e);
    }
}

/// Loads configuration from the environment and applies command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::from_env().context("loading configuration from environment")?;

    if let Some(repo) = &cli.repo {
        let repo_id = RepoId::parse(repo)
            .with_context(|| format!("--repo must look like owner/repo, got '{}'", repo))?;
        config = config.with_repo(repo_id);
    }
    if let Some(days) = cli.window_days {
        config.window_days = days;
    }

    config.validated()
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let sample_size = parse_sample_size(cli.count.as_deref());
    let options = ReportOptions::from_config(&config, sample_size);

    let client = GitHubClient::new(config.repo_id(), config.github_token.clone())
        .context("building GitHub client")?;

    tracing::info!(
        repo = %client.repo_id(),
        sample_size,
        window_days = config.window_days,
        review_concurrency = options.review_concurrency,
        "Sampling merged pull requests"
    );

    let repo_id = client.repo_id().clone();
    let report = generate_report(&client, repo_id, &options, chrono::Utc::now()).await;

    println!("{}", report.render(cli.format)?);
    Ok(())
}
