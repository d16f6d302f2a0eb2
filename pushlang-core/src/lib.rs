//! # pushlang-core
//!
//! Core library for pushlang - turns a GitHub user's recent push activity
//! into a per-language bar chart published to a gist.
//!
//! This library provides:
//! - A GitHub REST/GraphQL client behind the [`github::GitHubApi`] trait
//! - Activity collection and diff extraction
//! - A synthetic git corpus that a language classifier can inspect
//! - Statistics aggregation and the fixed-width text report
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use pushlang_core::classifier::Linguist;
//! use pushlang_core::corpus::CorpusBuilder;
//! use pushlang_core::github::GitHubClient;
//! use pushlang_core::pipeline::{Pipeline, RunSettings};
//! use pushlang_core::Config;
//!
//! # async fn example() -> pushlang_core::Result<()> {
//! let config = Config::load()?;
//! let creds = config.credentials()?;
//! let client = GitHubClient::new(&creds.token, &config.github)?;
//! let linguist = Linguist::new(&config.corpus.classifier);
//!
//! let settings = RunSettings {
//!     username: creds.username,
//!     gist_id: creds.gist_id,
//!     gist_title: config.report.gist_title.clone(),
//!     days: config.github.days,
//!     dry_run: false,
//!     corpus: CorpusBuilder::new(&config.corpus),
//! };
//! let summary = Pipeline::new(&client, &linguist).run(&settings).await?;
//! println!("{}", summary.content);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Public modules
pub mod activity;
pub mod classifier;
pub mod command;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod format;
pub mod github;
pub mod logging;
pub mod pipeline;
pub mod publisher;
pub mod report;
pub mod retry;
pub mod stats;
