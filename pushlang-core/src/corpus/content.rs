//! Synthetic file naming and content reconstruction.

use std::path::Path;

use crate::extract::ChangedFileRecord;

/// A throwaway file standing in for one changed-file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticFile {
    /// `<index>.<ext>`, relative to the corpus root
    pub name: String,
    pub content: String,
}

/// Name for the record at `index`: the ordinal plus the original extension.
///
/// Directories and the original basename are dropped.
pub fn synthetic_name(index: usize, original_path: &str) -> String {
    match Path::new(original_path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}.{}", index, ext),
        None => index.to_string(),
    }
}

/// Rebuild approximate file content from what the commit API returned.
///
/// - With a patch: the added and removed lines, markers stripped. Hunk
///   headers and context lines are dropped.
/// - Without a patch but with a change count: that many blank lines.
/// - Otherwise: empty.
pub fn reconstruct_content(record: &ChangedFileRecord) -> String {
    if let Some(patch) = record.patch.as_deref().filter(|p| !p.is_empty()) {
        return patch
            .split('\n')
            .filter(|line| line.starts_with('+') || line.starts_with('-'))
            .map(|line| &line[1..])
            .collect::<Vec<_>>()
            .join("\n");
    }

    match record.changes {
        Some(changes) if changes > 0 => "\n".repeat(changes as usize),
        _ => String::new(),
    }
}

/// Synthetic files for `records`, in input order.
pub fn synthesize(records: &[ChangedFileRecord]) -> Vec<SyntheticFile> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| SyntheticFile {
            name: synthetic_name(index, &record.path),
            content: reconstruct_content(record),
        })
        .collect()
}
