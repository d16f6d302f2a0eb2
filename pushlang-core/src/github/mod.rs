//! GitHub API access
//!
//! The pipeline stages depend on [`GitHubApi`] rather than on the concrete
//! [`GitHubClient`], so they can be driven by an in-memory implementation
//! in tests.

mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::GitHubClient;
pub use types::{ActivityEvent, CommitFile, Gist, GistUpdate, ResolvedCommit};

/// REST operations the collection and publishing stages need.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// One page of a user's public and private activity feed, newest first.
    async fn list_user_events(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityEvent>>;

    /// Full commit object including its file diffs.
    async fn get_commit(&self, repo: &str, sha: &str) -> Result<ResolvedCommit>;

    async fn get_gist(&self, gist_id: &str) -> Result<Gist>;

    async fn update_gist(&self, gist_id: &str, update: &GistUpdate) -> Result<()>;
}
