//! Project operations: existence check, creation and lookup by name

use crate::error::handlers::HttpErrorHandler;
use crate::error::{HarborError, Result};
use crate::registry::client::HarborClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    pub name: String,
}

pub struct ProjectOperations<'a> {
    client: &'a HarborClient,
}

impl<'a> ProjectOperations<'a> {
    pub fn new(client: &'a HarborClient) -> Self {
        Self { client }
    }

    /// Anything but 200 counts as absent, including server errors
    ///
    /// The HEAD goes through the client's re-login loop like every other call,
    /// so a 401 that survives the fresh login is `Unauthorized`, not absent.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let url = self
            .client
            .api_url_with_query("projects", &[("project_name", name)])?;
        let response = self.client.head(url).await?;
        Ok(response.status().as_u16() == 200)
    }

    /// Create `name` as a public project unless it already exists
    ///
    /// Only the first path segment is used, so a full repository path may be
    /// passed. Two callers racing on the same name can both try to create it.
    pub async fn ensure(&self, name: &str) -> Result<()> {
        let name = name.split('/').next().unwrap_or(name);
        if name.is_empty() {
            return Err(HarborError::Validation("project name cannot be empty".to_string()));
        }

        let output = self.client.output();
        if self.exists(name).await? {
            output.detail(&format!("Project {} already exists", name));
            return Ok(());
        }

        output.step(&format!("Creating project {}", name));
        let body = json!({
            "project_name": name,
            "metadata": {
                "public": "true"
            }
        });
        let response = self
            .client
            .post_json(self.client.api_url("projects")?, &body)
            .await?;

        let status = response.status();
        if !status.is_success() {
            output.error(&HttpErrorHandler::describe_status(
                status,
                &format!("create project {}", name),
            ));
            return Err(HarborError::ProjectCreate {
                project: name.to_string(),
                status: status.as_u16(),
            });
        }

        output.success(&format!("Created project {}", name));
        Ok(())
    }

    /// Look a project up by name; the API matches by prefix, so prefer an exact hit
    pub async fn find(&self, name: &str) -> Result<Project> {
        let url = self.client.api_url_with_query("projects", &[("name", name)])?;
        let response = self.client.get(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarborError::Network(HttpErrorHandler::describe_status(
                status,
                &format!("project lookup {}", name),
            )));
        }

        // older registries answer `null` instead of an empty list
        let projects: Option<Vec<Project>> = response.json().await?;
        let projects = projects.unwrap_or_default();

        let found = match projects.as_slice() {
            [] => None,
            [only] => Some(only.clone()),
            many => many.iter().find(|p| p.name == name).cloned(),
        };

        match found {
            Some(project) if project.project_id != 0 => Ok(project),
            _ => Err(HarborError::ProjectNotFound(name.to_string())),
        }
    }
}
