//! pushlang - recent coding languages, published to a gist
//!
//! Reads the push activity of a GitHub user, classifies the changed files by
//! language and overwrites a gist with a bar chart of the result.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/pushlang/config.toml (~/.config/pushlang/config.toml)
//! - Logs: $XDG_STATE_HOME/pushlang/ (~/.local/state/pushlang/)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pushlang_core::classifier::Linguist;
use pushlang_core::config::{self, ENV_DAYS, ENV_GIST_ID, ENV_TOKEN, ENV_USERNAME};
use pushlang_core::corpus::CorpusBuilder;
use pushlang_core::github::GitHubClient;
use pushlang_core::pipeline::{Pipeline, Progress, RunSettings};
use pushlang_core::Config;

#[derive(Parser)]
#[command(name = "pushlang")]
#[command(about = "Publish the languages of your recent GitHub pushes to a gist")]
#[command(version)]
struct Args {
    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/pushlang/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Collect, classify and publish (default)
    Run(RunArgs),

    /// Show resolved configuration and the authenticated account
    Status,
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Lookback window in whole days, clamped to 1..=30 (overrides DAYS)
    #[arg(long, value_parser = parse_days_arg)]
    days: Option<u32>,

    /// Print the report without updating the gist
    #[arg(long)]
    dry_run: bool,

    /// Reset and reuse this git checkout instead of a temporary directory
    #[arg(long)]
    workdir: Option<PathBuf>,
}

fn parse_days_arg(raw: &str) -> std::result::Result<u32, String> {
    config::parse_days(raw).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    let _log_guard = pushlang_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    match args.command {
        Some(Command::Status) => runtime.block_on(cmd_status(&config)),
        Some(Command::Run(run)) => runtime.block_on(cmd_run(&config, run)),
        None => runtime.block_on(cmd_run(&config, RunArgs::default())),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            config
                .apply_env()
                .context("failed to read configuration from environment")?;
            Ok(config)
        }
        None => Config::load().context("failed to load configuration"),
    }
}

async fn cmd_run(config: &Config, args: RunArgs) -> Result<()> {
    let creds = config.credentials()?;
    let days = args.days.unwrap_or(config.github.days);

    println!("Username: {}", creds.username);
    println!("Fetching data for the last {} days", days);

    let client =
        GitHubClient::new(&creds.token, &config.github).context("failed to create GitHub client")?;
    let linguist = Linguist::new(&config.corpus.classifier);

    let settings = RunSettings {
        username: creds.username,
        gist_id: creds.gist_id,
        gist_title: config.report.gist_title.clone(),
        days,
        dry_run: args.dry_run,
        corpus: CorpusBuilder::new(&config.corpus).with_workdir(args.workdir),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("fetching activity");

    let summary = Pipeline::new(&client, &linguist)
        .run_with_progress(&settings, |progress| match progress {
            Progress::CommitsFetched(count) => {
                pb.suspend(|| println!("{} commits fetched.", count));
                pb.set_message("building corpus");
            }
            Progress::FilesExtracted(count) => {
                tracing::debug!(files = count, "Files extracted");
                pb.set_message(format!("classifying {} files", count));
            }
            Progress::Classified(stats) => pb.suspend(|| {
                println!("Language statistics:");
                match serde_json::to_string_pretty(stats) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::warn!(error = %e, "Could not print statistics"),
                }
            }),
            Progress::Rendered(content) => {
                pb.suspend(|| {
                    println!("Generated content:");
                    println!("{}", content);
                });
                pb.set_message("publishing");
            }
        })
        .await;

    pb.finish_and_clear();
    let summary = summary.context("run failed")?;

    match &summary.published {
        Some(previous) => println!(
            "Update succeeded: {} -> {:?}",
            previous, config.report.gist_title
        ),
        None if settings.dry_run => println!("Dry run, gist not updated."),
        None => println!("Nothing to publish, gist left unchanged."),
    }

    tracing::info!(
        commits = summary.commits,
        files = summary.files,
        languages = summary.languages(),
        published = summary.published.is_some(),
        "Run finished"
    );

    Ok(())
}

async fn cmd_status(config: &Config) -> Result<()> {
    println!("pushlang Configuration");
    println!("======================");
    println!();

    let github = &config.github;
    println!("Config File:     {}", Config::config_path().display());
    println!("Log Directory:   {}", Config::state_dir().display());
    println!();
    println!(
        "{:<17}{}",
        format!("{}:", ENV_TOKEN),
        github.token.as_deref().map(mask).unwrap_or_else(not_set)
    );
    println!(
        "{:<17}{}",
        format!("{}:", ENV_GIST_ID),
        github.gist_id.clone().unwrap_or_else(not_set)
    );
    println!(
        "{:<17}{}",
        format!("{}:", ENV_USERNAME),
        github.username.clone().unwrap_or_else(not_set)
    );
    println!("{:<17}{}", format!("{}:", ENV_DAYS), github.days);
    println!("API URL:         {}", github.api_url);
    println!("Timeout:         {}s", github.timeout_secs);
    println!("Classifier:      {}", config.corpus.classifier);
    println!("Gist Title:      {}", config.report.gist_title);

    println!();
    let Some(token) = github.token.as_deref() else {
        println!("Status: Not authenticated ({} is not set)", ENV_TOKEN);
        return Ok(());
    };

    let client = GitHubClient::new(token, github).context("failed to create GitHub client")?;
    match client.viewer_login().await {
        Ok(login) => println!("Authenticated as: {}", login),
        Err(e) => println!("Authentication failed: {}", e),
    }

    match config.credentials() {
        Ok(_) => println!("Status: Ready to publish"),
        Err(e) => println!("Status: Not ready ({})", e),
    }

    Ok(())
}

fn not_set() -> String {
    "<not set>".to_string()
}

/// Keep only the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "<set>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
