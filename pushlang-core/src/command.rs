//! External command execution
//!
//! Every command runs with an explicit working directory; the process-wide
//! current directory is never changed.

use std::path::Path;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Run `program args...` in `cwd` and return its stdout.
///
/// A non-zero exit becomes [`Error::Command`] carrying stderr.
pub async fn run(program: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let rendered = render(program, args);
    tracing::debug!(cwd = %cwd.display(), "run > {}", rendered);

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::Command {
            command: rendered.clone(),
            status: "not started".to_string(),
            stderr: e.to_string(),
        })?;

    tracing::debug!(
        command = %rendered,
        code = ?output.status.code(),
        "exited"
    );

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(Error::Command {
            command: rendered,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let out = run("sh", &["-c", "printf hello"], dir.path()).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = run("ls", &[], dir.path()).await.unwrap();
        assert!(out.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run("sh", &["-c", "echo boom >&2; exit 3"], dir.path())
            .await
            .unwrap_err();
        match err {
            Error::Command {
                command, stderr, ..
            } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run("pushlang-no-such-binary", &[], dir.path()).await.is_err());
    }
}
