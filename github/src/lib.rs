//! Faultline GitHub Module
//!
//! Repository tree listing and file content retrieval against the GitHub
//! REST API, implementing the core's [`RepositoryReader`] seam. File content
//! is memoized in an insert-if-absent concurrent map; there is no
//! invalidation policy because one analysis service instance is expected to
//! point at one branch snapshot at a time.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use faultline_core::{RepoEntry, RepositoryReader};

const API_BASE: &str = "https://api.github.com";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const CLIENT_USER_AGENT: &str = "faultline-analyzer";

/// Errors that can occur talking to GitHub
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub returned status {status} for {path}")]
    Status { status: u16, path: String },

    #[error("tree listing for {owner}/{repo}@{branch} was truncated or empty")]
    EmptyTree {
        owner: String,
        repo: String,
        branch: String,
    },
}

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;

/// Configuration for one repository connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch to read; defaults to `main`
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Optional token for private repositories and higher rate limits
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token: None,
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<RepoEntry>,
    #[serde(default)]
    truncated: bool,
}

/// GitHub-backed repository reader with a file-content cache
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
    /// path -> content, insert-if-absent
    content_cache: DashMap<String, String>,
}

impl GithubClient {
    /// Create a client for one repository
    pub fn new(config: GithubConfig) -> Self {
        GithubClient {
            client: Client::new(),
            config,
            content_cache: DashMap::new(),
        }
    }

    /// Fetch the recursive tree listing for the configured branch
    pub async fn tree(&self) -> Result<Vec<RepoEntry>> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            API_BASE, self.config.owner, self.config.repo, self.config.branch
        );
        debug!(url = %url, "listing repository tree");

        let response = self.authorized(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(GithubError::Status {
                status: response.status().as_u16(),
                path: url,
            });
        }

        let listing: TreeResponse = response.json().await?;
        if listing.tree.is_empty() {
            return Err(GithubError::EmptyTree {
                owner: self.config.owner.clone(),
                repo: self.config.repo.clone(),
                branch: self.config.branch.clone(),
            });
        }
        if listing.truncated {
            warn!(
                "tree listing for {}/{} is truncated; resolution sees a partial repository",
                self.config.owner, self.config.repo
            );
        }

        info!(entries = listing.tree.len(), "repository tree listed");
        Ok(listing.tree)
    }

    /// Fetch one file's content, memoized per path
    pub async fn file_content(&self, path: &str) -> Result<String> {
        if let Some(cached) = self.content_cache.get(path) {
            debug!(path = %path, "file content cache hit");
            return Ok(cached.clone());
        }

        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            API_BASE, self.config.owner, self.config.repo, path, self.config.branch
        );
        debug!(url = %url, "fetching file content");

        let response = self
            .authorized(self.client.get(&url).header(ACCEPT, RAW_MEDIA_TYPE))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GithubError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let content = response.text().await?;
        // Insert-if-absent: a concurrent analysis may have raced us here and
        // the first written value wins.
        self.content_cache
            .entry(path.to_string())
            .or_insert_with(|| content.clone());
        Ok(content)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(USER_AGENT, CLIENT_USER_AGENT);
        match &self.config.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }
}

#[async_trait]
impl RepositoryReader for GithubClient {
    async fn list_tree(&self) -> anyhow::Result<Vec<RepoEntry>> {
        Ok(self.tree().await?)
    }

    async fn fetch_file(&self, path: &str) -> anyhow::Result<String> {
        Ok(self.file_content(path).await?)
    }
}
