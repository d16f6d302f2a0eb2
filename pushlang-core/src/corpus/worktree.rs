//! Isolated, history-less git working trees for the synthetic corpus.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::command;
use crate::error::{Error, Result};

/// Branch the corpus is committed to when an existing checkout is reused.
pub const CORPUS_BRANCH: &str = "pushlang-corpus";

/// A git working tree containing nothing but what the corpus puts in it.
///
/// A temporary tree is deleted when this value is dropped.
pub struct WorkTree {
    root: PathBuf,
    _temp: Option<TempDir>,
}

impl WorkTree {
    /// Fresh repository in a new temporary directory.
    pub async fn temporary() -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("pushlang-corpus-")
            .tempdir()?;
        let root = temp.path().to_path_buf();

        command::run("git", &["init", "--quiet"], &root).await?;
        tracing::debug!(root = %root.display(), "Initialised temporary corpus tree");

        Ok(Self {
            root,
            _temp: Some(temp),
        })
    }

    /// Reuse an existing checkout: point `HEAD` at an unborn
    /// [`CORPUS_BRANCH`] and delete every tracked and untracked entry apart
    /// from `.git`.
    ///
    /// A corpus commit left by an earlier run is discarded, so the branch
    /// never holds more than one commit and no extra branches pile up.
    pub async fn reset_existing(path: &Path) -> Result<Self> {
        if !path.join(".git").exists() {
            return Err(Error::Config(format!(
                "corpus workdir {} is not a git checkout",
                path.display()
            )));
        }
        let root = path.to_path_buf();
        let branch_ref = format!("refs/heads/{}", CORPUS_BRANCH);

        command::run("git", &["symbolic-ref", "HEAD", &branch_ref], &root).await?;
        let previous = command::run(
            "git",
            &["show-ref", "--verify", "--quiet", &branch_ref],
            &root,
        )
        .await
        .is_ok();
        if previous {
            command::run("git", &["update-ref", "-d", &branch_ref], &root).await?;
            tracing::debug!(branch = CORPUS_BRANCH, "Dropped previous corpus commit");
        }

        command::run(
            "git",
            &["rm", "-r", "-f", "--quiet", "--ignore-unmatch", "."],
            &root,
        )
        .await?;
        purge_untracked(&root).await?;

        tracing::info!(root = %root.display(), branch = CORPUS_BRANCH, "Reset corpus tree to orphan branch");

        Ok(Self { root, _temp: None })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Remove everything in `root` except the `.git` directory.
async fn purge_untracked(root: &Path) -> Result<()> {
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reset_rejects_non_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkTree::reset_existing(dir.path()).await.err().unwrap();
        assert!(err.to_string().contains("not a git checkout"));
    }

    #[tokio::test]
    async fn test_purge_keeps_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "fn x() {}").unwrap();
        std::fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();

        purge_untracked(dir.path()).await.unwrap();

        let left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(left, vec![".git".to_string()]);
    }
}
