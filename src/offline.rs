//! Offline repository stub
//!
//! Used when no GitHub repository is configured or `--no-repo` is passed:
//! the pipeline runs with an empty tree, so every report is produced without
//! file context. This is the documented resolution-miss path, not an error.

use async_trait::async_trait;

use faultline_core::{RepoEntry, RepositoryReader};

/// Repository reader that has no repository
pub struct OfflineRepository;

#[async_trait]
impl RepositoryReader for OfflineRepository {
    async fn list_tree(&self) -> anyhow::Result<Vec<RepoEntry>> {
        Ok(Vec::new())
    }

    async fn fetch_file(&self, path: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("no repository configured, cannot fetch {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_repository_lists_nothing() {
        let repo = OfflineRepository;
        assert!(repo.list_tree().await.unwrap().is_empty());
        assert!(repo.fetch_file("a.cls").await.is_err());
    }
}
