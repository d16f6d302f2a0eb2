//! Diff extraction: commit objects to flat changed-file records.

use serde::{Deserialize, Serialize};

use crate::github::{CommitFile, ResolvedCommit};

/// One file touched by one commit.
///
/// When all three counts are present, `additions + deletions == changes` is
/// expected but not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFileRecord {
    pub path: String,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changes: Option<u64>,
    pub status: String,
    pub patch: Option<String>,
}

impl From<CommitFile> for ChangedFileRecord {
    fn from(file: CommitFile) -> Self {
        Self {
            path: file.filename,
            additions: file.additions,
            deletions: file.deletions,
            changes: file.changes,
            status: file.status,
            patch: file.patch,
        }
    }
}

/// Flatten the file lists of all non-merge commits.
///
/// Merge commits are skipped: their diff is taken against more than one
/// base and would count the same change several times.
pub fn extract(commits: Vec<ResolvedCommit>) -> Vec<ChangedFileRecord> {
    commits
        .into_iter()
        .filter(|commit| !commit.is_merge())
        .flat_map(|commit| commit.files.unwrap_or_default())
        .map(ChangedFileRecord::from)
        .collect()
}
