//! Repository operations
//!
//! Implements the repository-level registry calls:
//! - Repository listing (GET /api/repositories?project_id={id})
//! - Tag existence checks (GET /api/repositories/{name}/tags/{tag})
//! - Tag deletion (DELETE /api/repositories/{name}/tags/{tag})

use crate::error::handlers::HttpErrorHandler;
use crate::error::{HarborError, Result};
use crate::registry::client::HarborClient;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
}

pub struct RepositoryOperations<'a> {
    client: &'a HarborClient,
}

impl<'a> RepositoryOperations<'a> {
    pub fn new(client: &'a HarborClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, project_id: i64) -> Result<Vec<Repository>> {
        let project_id = project_id.to_string();
        let url = self
            .client
            .api_url_with_query("repositories", &[("project_id", project_id.as_str())])?;
        let response = self.client.get(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarborError::Network(HttpErrorHandler::describe_status(
                status,
                &format!("repository listing for project {}", project_id),
            )));
        }

        let repositories: Option<Vec<Repository>> = response.json().await?;
        let repositories = repositories.unwrap_or_default();
        self.client.output().verbose(&format!(
            "Found {} repositories in project {}",
            repositories.len(),
            project_id
        ));
        Ok(repositories)
    }

    pub async fn tag_exists(&self, repository: &str, tag: &str) -> Result<bool> {
        let url = self.tag_url(repository, tag)?;
        let response = self.client.get(url).await?;
        Ok(response.status() == StatusCode::OK)
    }

    /// Returns the raw status; the caller decides what counts as deleted
    pub async fn delete_tag(&self, repository: &str, tag: &str) -> Result<StatusCode> {
        let url = self.tag_url(repository, tag)?;
        let response = self.client.delete(url).await?;
        Ok(response.status())
    }

    fn tag_url(&self, repository: &str, tag: &str) -> Result<url::Url> {
        self.client
            .api_url(&format!("repositories/{}/tags/{}", repository, tag))
    }
}
