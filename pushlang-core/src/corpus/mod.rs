//! Synthetic corpus
//!
//! The classifier needs a committed git tree, but pushlang never has the real
//! repositories. Instead every changed-file record becomes one small file
//! whose name keeps only the original extension and whose content is
//! rebuilt from the diff. The tree is committed exactly once and handed to
//! the classifier.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   .git/
//!   .gitattributes      marks every file linguist-detectable
//!   0.rs  1.py  2  ...   one file per record, named by input position
//! ```

mod content;
mod worktree;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;

use crate::command;
use crate::config::CorpusConfig;
use crate::error::{Error, Result};
use crate::extract::ChangedFileRecord;
use crate::retry::{retry, RetryPolicy};

pub use content::{reconstruct_content, synthesize, synthetic_name, SyntheticFile};
pub use worktree::{WorkTree, CORPUS_BRANCH};

/// Name of the marker file that overrides linguist's exclusion heuristics.
pub const MARKER_FILE: &str = ".gitattributes";

/// Marker content: every file with an extension counts, the marker itself does not.
pub const MARKER_CONTENT: &str = "*.* linguist-detectable\n/.gitattributes -linguist-detectable\n";

const COMMIT_MESSAGE: &str = "pushlang synthetic corpus";

/// A committed synthetic tree plus the records behind each synthetic path.
pub struct Corpus {
    tree: WorkTree,
    files: HashMap<String, ChangedFileRecord>,
}

impl Corpus {
    /// Root of the committed tree; pass this to the classifier.
    pub fn root(&self) -> &Path {
        self.tree.path()
    }

    /// Synthetic path (relative to the root) to original record.
    pub fn files(&self) -> &HashMap<String, ChangedFileRecord> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Builds a [`Corpus`] from changed-file records.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    workdir: Option<PathBuf>,
    retry_policy: RetryPolicy,
    identity_name: String,
    identity_email: String,
}

impl CorpusBuilder {
    pub fn new(config: &CorpusConfig) -> Self {
        Self {
            workdir: config.workdir.clone(),
            retry_policy: config.retry_policy(),
            identity_name: config.identity_name.clone(),
            identity_email: config.identity_email.clone(),
        }
    }

    /// Reuse an existing checkout instead of a temporary directory.
    pub fn with_workdir(mut self, workdir: Option<PathBuf>) -> Self {
        if workdir.is_some() {
            self.workdir = workdir;
        }
        self
    }

    /// Materialise and commit the synthetic tree.
    ///
    /// File writes, the marker write and identity setup run concurrently;
    /// the commit waits for all of them. Marker and identity steps are
    /// retried under the configured policy, everything else fails the build
    /// on the first error.
    pub async fn build(&self, records: Vec<ChangedFileRecord>) -> Result<Corpus> {
        let tree = match &self.workdir {
            Some(path) => WorkTree::reset_existing(path).await?,
            None => WorkTree::temporary().await?,
        };
        let root = tree.path().to_path_buf();

        let synthetic = synthesize(&records);
        tracing::info!(files = synthetic.len(), root = %root.display(), "Writing synthetic corpus");

        let writes = try_join_all(synthetic.iter().map(|file| {
            let path = root.join(&file.name);
            async move {
                tokio::fs::write(&path, &file.content).await?;
                Ok::<_, Error>(())
            }
        }));
        let marker = retry(self.retry_policy, "write marker", || {
            let path = root.join(MARKER_FILE);
            async move {
                tokio::fs::write(&path, MARKER_CONTENT).await?;
                Ok::<_, Error>(())
            }
        });
        let identity = retry(self.retry_policy, "configure identity", || {
            self.configure_identity(&root)
        });

        tokio::try_join!(writes, marker, identity)?;

        command::run("git", &["add", "--all", "."], &root).await?;
        command::run(
            "git",
            &[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--quiet",
                "--no-verify",
                "--allow-empty",
                "-m",
                COMMIT_MESSAGE,
            ],
            &root,
        )
        .await?;

        let files = synthetic
            .into_iter()
            .map(|file| file.name)
            .zip(records)
            .collect();

        Ok(Corpus { tree, files })
    }

    async fn configure_identity(&self, root: &Path) -> Result<()> {
        command::run("git", &["config", "user.name", &self.identity_name], root).await?;
        command::run("git", &["config", "user.email", &self.identity_email], root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn record(path: &str, additions: u64, deletions: u64, patch: Option<&str>) -> ChangedFileRecord {
        ChangedFileRecord {
            path: path.to_string(),
            additions: Some(additions),
            deletions: Some(deletions),
            changes: Some(additions + deletions),
            status: "modified".to_string(),
            patch: patch.map(str::to_string),
        }
    }

    #[test]
    fn test_with_workdir_only_overrides_when_given() {
        let config = CorpusConfig {
            workdir: Some(PathBuf::from("/srv/checkout")),
            ..Default::default()
        };
        let builder = CorpusBuilder::new(&config).with_workdir(None);
        assert_eq!(builder.workdir, Some(PathBuf::from("/srv/checkout")));

        let builder = builder.with_workdir(Some(PathBuf::from("/tmp/other")));
        assert_eq!(builder.workdir, Some(PathBuf::from("/tmp/other")));
    }

    #[tokio::test]
    async fn test_build_commits_synthetic_tree() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let builder = CorpusBuilder::new(&CorpusConfig::default());
        let corpus = builder
            .build(vec![
                record("src/lib.rs", 2, 1, Some("@@ -1 +1,2 @@\n+fn a() {}\n+fn b() {}\n-fn c() {}")),
                record("data/big.json", 3, 0, None),
            ])
            .await
            .unwrap();

        let root = corpus.root().to_path_buf();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.files()["0.rs"].path, "src/lib.rs");
        assert_eq!(corpus.files()["1.json"].path, "data/big.json");
        assert_eq!(
            std::fs::read_to_string(root.join("0.rs")).unwrap(),
            "fn a() {}\nfn b() {}\nfn c() {}"
        );
        assert_eq!(std::fs::read_to_string(root.join("1.json")).unwrap(), "\n\n\n");
        assert_eq!(
            std::fs::read_to_string(root.join(MARKER_FILE)).unwrap(),
            MARKER_CONTENT
        );

        let log = command::run("git", &["rev-list", "--count", "HEAD"], &root)
            .await
            .unwrap();
        assert_eq!(log.trim(), "1");

        let tracked = command::run("git", &["ls-files"], &root).await.unwrap();
        let mut tracked: Vec<&str> = tracked.lines().collect();
        tracked.sort_unstable();
        assert_eq!(tracked, vec![".gitattributes", "0.rs", "1.json"]);

        drop(corpus);
        assert!(!root.exists(), "temporary corpus should be removed on drop");
    }

    /// A checkout with one seeded commit on its default branch.
    fn seeded_checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let git = |args: &[&str]| {
            let status = std::process::Command::new("git")
                .args(args)
                .current_dir(dir.path())
                .status()
                .unwrap();
            assert!(status.success(), "git {:?}", args);
        };
        git(&["init", "--quiet"]);
        std::fs::write(dir.path().join("main.go"), "package main").unwrap();
        git(&["add", "main.go"]);
        git(&[
            "-c",
            "user.name=t",
            "-c",
            "user.email=t@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
            "seed",
        ]);
        dir
    }

    fn builder_for(dir: &Path, attempts: u32, delay_ms: u64) -> CorpusBuilder {
        let config = CorpusConfig {
            retry_attempts: attempts,
            retry_delay_ms: delay_ms,
            ..Default::default()
        };
        CorpusBuilder::new(&config).with_workdir(Some(dir.to_path_buf()))
    }

    #[tokio::test]
    async fn test_reused_workdir_builds_back_to_back() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let dir = seeded_checkout();
        let builder = builder_for(dir.path(), 1, 1);

        let first = builder
            .build(vec![record("a.rs", 1, 0, Some("+a"))])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        drop(first);

        let second = builder
            .build(vec![
                record("b.py", 1, 0, Some("+b")),
                record("c.py", 1, 0, Some("+c")),
            ])
            .await
            .unwrap();
        assert_eq!(second.len(), 2);

        let root = second.root();
        let head = command::run("git", &["symbolic-ref", "HEAD"], root)
            .await
            .unwrap();
        assert_eq!(head.trim(), format!("refs/heads/{}", CORPUS_BRANCH));

        let count = command::run("git", &["rev-list", "--count", "HEAD"], root)
            .await
            .unwrap();
        assert_eq!(count.trim(), "1", "previous corpus commit should be discarded");

        let tracked = command::run("git", &["ls-files"], root).await.unwrap();
        let mut tracked: Vec<&str> = tracked.lines().collect();
        tracked.sort_unstable();
        assert_eq!(tracked, vec![".gitattributes", "0.py", "1.py"]);

        let branches = command::run(
            "git",
            &["for-each-ref", "--format=%(refname)", "refs/heads"],
            root,
        )
        .await
        .unwrap();
        assert_eq!(branches.lines().count(), 2, "branches: {}", branches);
        assert!(dir.path().exists(), "reused workdir must survive the corpus");
    }

    #[tokio::test]
    async fn test_identity_setup_retries_past_config_lock() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let dir = seeded_checkout();
        let lock = dir.path().join(".git/config.lock");
        std::fs::write(&lock, "").unwrap();

        let release = {
            let lock = lock.clone();
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                tokio::fs::remove_file(&lock).await.unwrap();
            })
        };

        let corpus = builder_for(dir.path(), 2, 100)
            .build(vec![record("a.rs", 1, 0, Some("+a"))])
            .await
            .unwrap();
        release.await.unwrap();

        let name = command::run("git", &["config", "user.name"], corpus.root())
            .await
            .unwrap();
        assert_eq!(name.trim(), "pushlang");
    }

    #[tokio::test]
    async fn test_identity_setup_gives_up_after_policy() {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }

        let dir = seeded_checkout();
        std::fs::write(dir.path().join(".git/config.lock"), "").unwrap();

        let err = builder_for(dir.path(), 2, 10)
            .build(vec![record("a.rs", 1, 0, Some("+a"))])
            .await
            .err()
            .unwrap();
        match err {
            Error::Command { command, .. } => assert!(command.starts_with("git config")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
