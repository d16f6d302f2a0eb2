//! Gist publishing
//!
//! The target gist is expected to hold a single file. Its first file (in API
//! response order) is renamed to the report title and its content replaced.

use crate::error::{Error, Result};
use crate::github::{GistUpdate, GitHubApi};

/// Overwrite the first file of `gist_id` with `content`, renaming it to `title`.
///
/// Returns the file name the gist had before the update.
pub async fn publish(
    api: &dyn GitHubApi,
    gist_id: &str,
    title: &str,
    content: &str,
) -> Result<String> {
    let gist = api.get_gist(gist_id).await.map_err(|e| {
        if e.is_not_found() {
            Error::Publish(format!("gist {} not found", gist_id))
        } else {
            e
        }
    })?;

    let filename = gist
        .first_filename()
        .ok_or_else(|| Error::Publish(format!("gist {} has no files", gist_id)))?
        .to_string();
    if gist.files.len() > 1 {
        tracing::warn!(
            gist_id = %gist_id,
            files = gist.files.len(),
            target = %filename,
            "Gist has several files, updating the first"
        );
    }

    let update = GistUpdate::single_file(&filename, title, content);
    api.update_gist(gist_id, &update).await?;

    tracing::info!(gist_id = %gist_id, file = %filename, title = %title, "Gist updated");
    Ok(filename)
}
