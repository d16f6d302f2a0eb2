//! HTTP client for the GitHub REST and GraphQL APIs
//!
//! Thin authenticated wrapper: one request per call, no retries. Callers
//! decide how to treat partial failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::GitHubConfig;
use crate::error::{Error, Result};

use super::types::{ActivityEvent, Gist, GistUpdate, GraphqlResponse, ResolvedCommit};
use super::GitHubApi;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Authenticated GitHub API client
pub struct GitHubClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client that authenticates with `token`.
    pub fn new(token: &str, config: &GitHubConfig) -> Result<Self> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("github.api_url must not be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pushlang/", env!("CARGO_PKG_VERSION"))),
        );

        let mut auth_value = HeaderValue::from_str(&format!("bearer {}", token))
            .map_err(|e| Error::Config(format!("invalid GH_TOKEN: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// The REST root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a GraphQL query and return its `data` object.
    ///
    /// A non-empty `errors` array is reported as an API error even on HTTP 200.
    pub async fn graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = graphql_url(&self.base_url);
        tracing::debug!(url = %url, "POST graphql");

        let response = self
            .http_client
            .post(&url)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let body: GraphqlResponse<serde_json::Value> = read_json(response).await?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Api {
                status: 200,
                message: format!("GraphQL errors: {}", message),
            });
        }

        body.data
            .ok_or_else(|| Error::Http("GraphQL response has no data".to_string()))
    }

    /// Login of the account the token belongs to.
    pub async fn viewer_login(&self) -> Result<String> {
        let data = self
            .graphql("query { viewer { login } }", serde_json::json!({}))
            .await?;
        let viewer: ViewerData = serde_json::from_value(data)?;
        Ok(viewer.viewer.login)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        read_json(response).await
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn list_user_events(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityEvent>> {
        self.get_json(&format!(
            "/users/{}/events?per_page={}&page={}",
            urlencoding::encode(username),
            per_page,
            page
        ))
        .await
    }

    async fn get_commit(&self, repo: &str, sha: &str) -> Result<ResolvedCommit> {
        self.get_json(&format!(
            "/repos/{}/commits/{}",
            encode_repo(repo),
            urlencoding::encode(sha)
        ))
        .await
    }

    async fn get_gist(&self, gist_id: &str) -> Result<Gist> {
        self.get_json(&format!("/gists/{}", urlencoding::encode(gist_id)))
            .await
    }

    async fn update_gist(&self, gist_id: &str, update: &GistUpdate) -> Result<()> {
        let url = format!("{}/gists/{}", self.base_url, urlencoding::encode(gist_id));
        tracing::debug!(url = %url, "PATCH");

        let response = self
            .http_client
            .patch(&url)
            .json(update)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let _: serde_json::Value = read_json(response).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    login: String,
}

/// Decode a successful response body, or turn the status and body text into an error.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| Error::Http(format!("failed to parse response: {}", e)))
    } else {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Err(Error::Api {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

/// Percent-encode `owner/name` segment by segment, keeping the separator.
fn encode_repo(repo: &str) -> String {
    repo.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// GraphQL endpoint for a REST root.
///
/// GitHub Enterprise serves REST at `/api/v3` and GraphQL at `/api/graphql`.
fn graphql_url(base_url: &str) -> String {
    match base_url.strip_suffix("/v3") {
        Some(api_root) => format!("{}/graphql", api_root),
        None => format!("{}/graphql", base_url),
    }
}
