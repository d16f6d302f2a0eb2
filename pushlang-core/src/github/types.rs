//! Wire types for the subset of the GitHub API pushlang consumes.
//!
//! Only fields that the pipeline reads are modelled; everything else in the
//! response bodies is ignored by serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Event type string for pushes in the activity feed.
pub const PUSH_EVENT: &str = "PushEvent";

/// One entry of `GET /users/{username}/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub actor: Actor,
    pub repo: RepoRef,
    pub created_at: DateTime<Utc>,
    /// Only push payloads carry commits; other event types deserialize to an empty payload.
    #[serde(default)]
    pub payload: EventPayload,
}

impl ActivityEvent {
    pub fn is_push(&self) -> bool {
        self.event_type == PUSH_EVENT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRef {
    /// `owner/name`
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

/// Commit reference embedded in a push payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushCommit {
    pub sha: String,
    /// False when the commit was already pushed through another ref.
    #[serde(default)]
    pub distinct: bool,
}

/// Full commit object from `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCommit {
    pub sha: String,
    #[serde(default)]
    pub parents: Vec<CommitParent>,
    #[serde(default)]
    pub files: Option<Vec<CommitFile>>,
}

impl ResolvedCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitParent {
    pub sha: String,
}

/// Per-file entry of a commit diff.
///
/// `patch` is absent for binary files and for diffs GitHub considers too large.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFile {
    pub filename: String,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changes: Option<u64>,
    #[serde(default)]
    pub status: String,
    pub patch: Option<String>,
}

/// `GET /gists/{id}`. File order follows the response body.
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub files: serde_json::Map<String, serde_json::Value>,
}

impl Gist {
    /// Name of the first file as returned by the API.
    pub fn first_filename(&self) -> Option<&str> {
        self.files.keys().next().map(String::as_str)
    }
}

/// Body of `PATCH /gists/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct GistUpdate {
    pub files: BTreeMap<String, GistFileUpdate>,
}

impl GistUpdate {
    /// Rename `filename` to `title` and replace its content.
    pub fn single_file(filename: &str, title: &str, content: &str) -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            filename.to_string(),
            GistFileUpdate {
                filename: title.to_string(),
                content: content.to_string(),
            },
        );
        Self { files }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GistFileUpdate {
    pub filename: String,
    pub content: String,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}
