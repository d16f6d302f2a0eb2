//! End-to-end run
//!
//! ```text
//! feed ──► activity::collect ──► extract ──► CorpusBuilder ──► Classifier
//!                                                                   │
//!              gist ◄── publisher ◄── report::render ◄── stats ◄────┘
//! ```
//!
//! The synthetic corpus lives only as long as the classifier needs it and is
//! dropped before anything is published.

use chrono::{Duration, Utc};

use crate::activity;
use crate::classifier::Classifier;
use crate::corpus::CorpusBuilder;
use crate::error::Result;
use crate::extract;
use crate::github::GitHubApi;
use crate::publisher;
use crate::report;
use crate::stats::{self, LanguageStat};

/// Inputs for a single run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub username: String,
    pub gist_id: String,
    pub gist_title: String,
    /// Lookback window, already clamped
    pub days: u32,
    /// Render the report but leave the gist alone
    pub dry_run: bool,
    pub corpus: CorpusBuilder,
}

/// Stage notifications emitted while a run progresses.
#[derive(Debug)]
pub enum Progress<'a> {
    CommitsFetched(usize),
    FilesExtracted(usize),
    Classified(&'a [LanguageStat]),
    Rendered(&'a str),
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Distinct commits resolved from the feed
    pub commits: usize,
    /// Changed-file records extracted from non-merge commits
    pub files: usize,
    pub stats: Vec<LanguageStat>,
    /// Rendered report
    pub content: String,
    /// Name the gist file had before it was overwritten, if it was
    pub published: Option<String>,
}

impl RunSummary {
    pub fn languages(&self) -> usize {
        self.stats.len()
    }
}

/// Wires the stages together over a feed source and a classifier.
pub struct Pipeline<'a> {
    api: &'a dyn GitHubApi,
    classifier: &'a dyn Classifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(api: &'a dyn GitHubApi, classifier: &'a dyn Classifier) -> Self {
        Self { api, classifier }
    }

    pub async fn run(&self, settings: &RunSettings) -> Result<RunSummary> {
        self.run_with_progress(settings, |_| {}).await
    }

    /// Run every stage, reporting progress through `on_progress`.
    ///
    /// Any stage failure aborts the run before the gist is touched.
    pub async fn run_with_progress<F>(
        &self,
        settings: &RunSettings,
        mut on_progress: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(Progress<'_>),
    {
        let since = Utc::now() - Duration::days(i64::from(settings.days));
        tracing::info!(
            username = %settings.username,
            days = settings.days,
            since = %since,
            "Starting run"
        );

        let commits = activity::collect(self.api, &settings.username, since).await?;
        let commit_count = commits.len();
        on_progress(Progress::CommitsFetched(commit_count));

        let records = extract::extract(commits);
        let file_count = records.len();
        on_progress(Progress::FilesExtracted(file_count));

        let stats = if records.is_empty() {
            tracing::info!("No changed files in window, skipping classification");
            Vec::new()
        } else {
            let corpus = settings.corpus.build(records).await?;
            let breakdown = self.classifier.classify(corpus.root()).await?;
            tracing::info!(
                languages = breakdown.len(),
                files = corpus.len(),
                "Corpus classified"
            );
            stats::aggregate(&breakdown, corpus.files())
        };
        on_progress(Progress::Classified(&stats));

        let content = report::render(&stats);
        on_progress(Progress::Rendered(&content));

        let published = if settings.dry_run {
            tracing::info!("Dry run, gist not updated");
            None
        } else if content.is_empty() {
            tracing::warn!(gist_id = %settings.gist_id, "Empty report, gist left unchanged");
            None
        } else {
            Some(
                publisher::publish(self.api, &settings.gist_id, &settings.gist_title, &content)
                    .await?,
            )
        };

        Ok(RunSummary {
            commits: commit_count,
            files: file_count,
            stats,
            content,
            published,
        })
    }
}
