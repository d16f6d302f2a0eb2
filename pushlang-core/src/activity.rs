//! Activity collection
//!
//! Walks a user's event feed (newest first) and resolves every distinct
//! commit they pushed inside the lookback window to a full commit object.
//!
//! ## Pagination
//!
//! Pages of [`EVENTS_PER_PAGE`] are requested until [`MAX_EVENTS`] have been
//! covered or a page crosses the date boundary. A page "crosses" when some of
//! the user's push events on it are older than the window. A page with no
//! push events by the user at all does not count as crossing, so collection
//! moves on to the next page in that case.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::error::Result;
use crate::github::{ActivityEvent, GitHubApi, ResolvedCommit};

/// Events requested per feed page.
pub const EVENTS_PER_PAGE: u32 = 100;

/// Upper bound on feed events inspected per run.
pub const MAX_EVENTS: u32 = 300;

/// Collect the commits `username` pushed after `since`.
///
/// A feed page that cannot be fetched fails the run. A single commit that
/// cannot be resolved is logged and left out.
pub async fn collect(
    api: &dyn GitHubApi,
    username: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ResolvedCommit>> {
    let pages = (MAX_EVENTS + EVENTS_PER_PAGE - 1) / EVENTS_PER_PAGE;
    let mut commits = Vec::new();

    for page in 1..=pages {
        let events = api
            .list_user_events(username, page, EVENTS_PER_PAGE)
            .await?;
        if events.is_empty() {
            tracing::debug!(page, "Activity feed exhausted");
            break;
        }

        let pushes: Vec<&ActivityEvent> = events
            .iter()
            .filter(|event| event.is_push() && event.actor.login == username)
            .collect();
        let recent: Vec<&ActivityEvent> = pushes
            .iter()
            .copied()
            .filter(|event| event.created_at > since)
            .collect();

        tracing::info!(
            page,
            events = events.len(),
            pushes = pushes.len(),
            "{} events fetched.",
            recent.len()
        );

        commits.extend(resolve_distinct(api, &recent).await);

        if recent.len() < pushes.len() {
            tracing::debug!(page, "Page crosses the lookback boundary, stopping");
            break;
        }
    }

    Ok(commits)
}

/// Resolve every distinct commit of `events` concurrently.
///
/// All requests are awaited; failures are dropped without affecting siblings.
async fn resolve_distinct(api: &dyn GitHubApi, events: &[&ActivityEvent]) -> Vec<ResolvedCommit> {
    let refs: Vec<(&str, &str)> = events
        .iter()
        .flat_map(|event| {
            event
                .payload
                .commits
                .iter()
                .filter(|commit| commit.distinct)
                .map(move |commit| (event.repo.name.as_str(), commit.sha.as_str()))
        })
        .collect();

    let results = join_all(refs.iter().map(|(repo, sha)| api.get_commit(repo, sha))).await;

    let mut resolved = Vec::with_capacity(results.len());
    for ((repo, sha), result) in refs.iter().zip(results) {
        match result {
            Ok(commit) => resolved.push(commit),
            Err(e) => {
                tracing::warn!(repo = %repo, sha = %sha, error = %e, "Dropping unresolved commit");
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::github::types::{Actor, EventPayload, PushCommit, RepoRef};
    use crate::github::{Gist, GistUpdate};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeFeed {
        pages: HashMap<u32, Vec<ActivityEvent>>,
        missing: Vec<String>,
        requested_pages: Mutex<Vec<u32>>,
        requested_commits: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GitHubApi for FakeFeed {
        async fn list_user_events(
            &self,
            _username: &str,
            page: u32,
            _per_page: u32,
        ) -> Result<Vec<ActivityEvent>> {
            self.requested_pages.lock().unwrap().push(page);
            Ok(self.pages.get(&page).cloned().unwrap_or_default())
        }

        async fn get_commit(&self, repo: &str, sha: &str) -> Result<ResolvedCommit> {
            self.requested_commits.lock().unwrap().push(sha.to_string());
            if self.missing.iter().any(|m| m == sha) {
                return Err(Error::Api {
                    status: 404,
                    message: format!("{}@{} not found", repo, sha),
                });
            }
            Ok(ResolvedCommit {
                sha: sha.to_string(),
                parents: vec![],
                files: Some(vec![]),
            })
        }

        async fn get_gist(&self, _gist_id: &str) -> Result<Gist> {
            unreachable!("collector never reads gists")
        }

        async fn update_gist(&self, _gist_id: &str, _update: &GistUpdate) -> Result<()> {
            unreachable!("collector never writes gists")
        }
    }

    fn push(login: &str, created_at: DateTime<Utc>, commits: &[(&str, bool)]) -> ActivityEvent {
        ActivityEvent {
            id: format!("evt-{}", commits.first().map(|c| c.0).unwrap_or("none")),
            event_type: "PushEvent".to_string(),
            actor: Actor {
                login: login.to_string(),
            },
            repo: RepoRef {
                name: "octocat/hello".to_string(),
            },
            created_at,
            payload: EventPayload {
                commits: commits
                    .iter()
                    .map(|(sha, distinct)| PushCommit {
                        sha: sha.to_string(),
                        distinct: *distinct,
                    })
                    .collect(),
            },
        }
    }

    fn other(event_type: &str, created_at: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            event_type: event_type.to_string(),
            ..push("octocat", created_at, &[])
        }
    }

    fn shas(commits: &[ResolvedCommit]) -> Vec<&str> {
        commits.iter().map(|c| c.sha.as_str()).collect()
    }

    #[tokio::test]
    async fn test_stops_after_page_crossing_boundary() {
        let now = Utc::now();
        let since = now - Duration::days(14);

        let mut feed = FakeFeed::default();
        feed.pages.insert(
            1,
            vec![
                push("octocat", now - Duration::days(1), &[("a1", true)]),
                push("octocat", now - Duration::days(2), &[("a2", true)]),
            ],
        );
        feed.pages.insert(
            2,
            vec![
                push("octocat", now - Duration::days(20), &[("old1", true)]),
                push("octocat", now - Duration::days(21), &[("old2", true)]),
            ],
        );
        feed.pages.insert(
            3,
            vec![push("octocat", now - Duration::days(1), &[("never", true)])],
        );

        let commits = collect(&feed, "octocat", since).await.unwrap();

        assert_eq!(shas(&commits), vec!["a1", "a2"]);
        assert_eq!(*feed.requested_pages.lock().unwrap(), vec![1, 2]);
        let requested = feed.requested_commits.lock().unwrap();
        assert!(!requested.iter().any(|sha| sha.starts_with("old")));
    }

    #[tokio::test]
    async fn test_filters_actor_type_and_distinct() {
        let now = Utc::now();
        let since = now - Duration::days(14);

        let mut feed = FakeFeed::default();
        feed.pages.insert(
            1,
            vec![
                push("octocat", now, &[("mine", true), ("dup", false)]),
                push("octo-org-bot", now, &[("bot", true)]),
                other("IssuesEvent", now),
            ],
        );

        let commits = collect(&feed, "octocat", since).await.unwrap();

        assert_eq!(shas(&commits), vec!["mine"]);
        assert_eq!(*feed.requested_commits.lock().unwrap(), vec!["mine"]);
    }

    #[tokio::test]
    async fn test_failed_commit_does_not_abort_siblings() {
        let now = Utc::now();
        let since = now - Duration::days(14);

        let mut feed = FakeFeed {
            missing: vec!["gone".to_string()],
            ..Default::default()
        };
        feed.pages.insert(
            1,
            vec![push(
                "octocat",
                now,
                &[("first", true), ("gone", true), ("last", true)],
            )],
        );

        let commits = collect(&feed, "octocat", since).await.unwrap();

        assert_eq!(shas(&commits), vec!["first", "last"]);
    }

    #[tokio::test]
    async fn test_page_without_own_pushes_keeps_paginating() {
        let now = Utc::now();
        let since = now - Duration::days(14);

        let mut feed = FakeFeed::default();
        feed.pages.insert(1, vec![other("WatchEvent", now)]);
        feed.pages.insert(
            2,
            vec![push("octocat", now - Duration::days(1), &[("later", true)])],
        );

        let commits = collect(&feed, "octocat", since).await.unwrap();

        assert_eq!(shas(&commits), vec!["later"]);
        assert_eq!(*feed.requested_pages.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_feed() {
        let now = Utc::now();
        let mut feed = FakeFeed::default();
        feed.pages.insert(1, vec![push("octocat", now, &[("only", true)])]);

        let commits = collect(&feed, "octocat", now - Duration::days(1))
            .await
            .unwrap();

        assert_eq!(shas(&commits), vec!["only"]);
        assert_eq!(*feed.requested_pages.lock().unwrap(), vec![1, 2]);
    }
}
