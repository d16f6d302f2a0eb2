//! Per-language statistics
//!
//! Joins the classifier's file attribution back onto the changed-line
//! counts of the original records. The share of each language is the share
//! of changed lines (additions + deletions), not the classifier's byte share.

use std::collections::HashMap;

use serde::Serialize;

use crate::classifier::LanguageBreakdown;
use crate::extract::ChangedFileRecord;

/// Final per-language figures rendered into the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub name: String,
    /// Share of all changed lines, 0-100
    pub percent: f64,
    pub additions: u64,
    pub deletions: u64,
    /// Files attributed to this language by the classifier
    pub count: usize,
}

impl LanguageStat {
    pub fn changed_lines(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Aggregate classifier output into language statistics.
///
/// Paths the classifier reports that have no record contribute nothing.
/// When no lines changed at all the result is empty. Otherwise the list is
/// sorted by `percent`, highest first, keeping classifier order on ties.
pub fn aggregate(
    breakdown: &[LanguageBreakdown],
    files: &HashMap<String, ChangedFileRecord>,
) -> Vec<LanguageStat> {
    let mut stats: Vec<LanguageStat> = breakdown
        .iter()
        .map(|language| {
            let (additions, deletions) = language
                .files
                .iter()
                .filter_map(|path| files.get(path))
                .fold((0u64, 0u64), |(adds, dels), record| {
                    (
                        adds + record.additions.unwrap_or(0),
                        dels + record.deletions.unwrap_or(0),
                    )
                });
            LanguageStat {
                name: language.language.clone(),
                percent: 0.0,
                additions,
                deletions,
                count: language.files.len(),
            }
        })
        .collect();

    let total: u64 = stats.iter().map(LanguageStat::changed_lines).sum();
    if total == 0 {
        tracing::info!(
            languages = stats.len(),
            "No changed lines attributed to any language"
        );
        return Vec::new();
    }

    for stat in &mut stats {
        stat.percent = stat.changed_lines() as f64 / total as f64 * 100.0;
    }

    // sort_by is stable, so equal shares keep classifier order
    stats.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    stats
}
