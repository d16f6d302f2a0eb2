//! Language classification of a committed tree
//!
//! The classifier is a black box that looks at file extensions and content
//! and reports, per language, which files it attributed and what share of
//! bytes they represent. [`Linguist`] drives `github-linguist`; tests use
//! their own [`Classifier`] implementations.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::command;
use crate::error::{Error, Result};

/// Classifier verdict for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageBreakdown {
    pub language: String,
    /// Share of classified bytes, 0-100. Informational only; statistics are
    /// recomputed from changed lines.
    pub percentage: f64,
    /// Paths relative to the tree root
    pub files: Vec<String>,
}

/// Classifies the files of a committed git tree by language.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Per-language breakdown, in the classifier's own output order.
    async fn classify(&self, tree_root: &Path) -> Result<Vec<LanguageBreakdown>>;
}

/// `github-linguist --breakdown --json`
#[derive(Debug, Clone)]
pub struct Linguist {
    program: String,
}

impl Linguist {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Classifier for Linguist {
    async fn classify(&self, tree_root: &Path) -> Result<Vec<LanguageBreakdown>> {
        let stdout = command::run(&self.program, &["--breakdown", "--json"], tree_root).await?;
        parse_breakdown(&stdout)
    }
}

#[derive(Deserialize)]
struct RawLanguage {
    #[serde(default)]
    percentage: Percentage,
    #[serde(default)]
    files: Vec<String>,
}

/// linguist prints percentages as strings ("42.50"); accept numbers too.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum Percentage {
    Text(String),
    Number(f64),
    #[default]
    Missing,
}

impl Percentage {
    fn value(&self) -> f64 {
        match self {
            Percentage::Text(s) => s.trim().parse().unwrap_or(0.0),
            Percentage::Number(n) => *n,
            Percentage::Missing => 0.0,
        }
    }
}

/// Parse linguist's JSON breakdown, keeping its language order.
pub fn parse_breakdown(json: &str) -> Result<Vec<LanguageBreakdown>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let languages: serde_json::Map<String, serde_json::Value> = serde_json::from_str(trimmed)
        .map_err(|e| Error::Classifier(format!("unexpected breakdown output: {}", e)))?;

    languages
        .into_iter()
        .map(|(language, value)| {
            let raw: RawLanguage = serde_json::from_value(value).map_err(|e| {
                Error::Classifier(format!("bad breakdown entry for {}: {}", language, e))
            })?;
            Ok(LanguageBreakdown {
                language,
                percentage: raw.percentage.value(),
                files: raw.files,
            })
        })
        .collect()
}
