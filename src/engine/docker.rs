//! Docker daemon implementation of the container engine

use crate::config::AuthConfig;
use crate::engine::ContainerEngine;
use crate::error::{HarborError, Result};
use crate::image::split_tag;
use crate::logging::Logger;
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::errors::Error as BollardError;
use bollard::image::{CreateImageOptions, PushImageOptions, TagImageOptions};
use futures::StreamExt;
use std::time::Duration;

pub struct DockerEngine {
    docker: Docker,
    credentials: Option<DockerCredentials>,
    output: Logger,
}

impl DockerEngine {
    /// Connect to the local daemon (socket, named pipe or DOCKER_HOST)
    pub fn connect(timeout: Duration, output: Logger) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| HarborError::Engine(format!("Failed to connect to Docker: {}", e)))?
            .with_timeout(timeout);

        Ok(Self {
            docker,
            credentials: None,
            output,
        })
    }

    /// Forward registry credentials on every pull and push
    pub fn with_credentials(mut self, auth: &AuthConfig, server_address: &str) -> Self {
        self.credentials = Some(DockerCredentials {
            username: Some(auth.username.clone()),
            password: Some(auth.password.clone()),
            serveraddress: Some(server_address.to_string()),
            ..Default::default()
        });
        self
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn pull(&self, reference: &str) -> Result<Option<String>> {
        let (repository, tag) = split_tag(reference);
        self.output.verbose(&format!("Pulling {}", reference));

        let options = CreateImageOptions {
            from_image: repository,
            tag,
            ..Default::default()
        };
        let mut stream = self
            .docker
            .create_image(Some(options), None, self.credentials.clone());

        while let Some(info) = stream.next().await {
            let info = info
                .map_err(|e| HarborError::Engine(format!("pull {} failed: {}", reference, e)))?;
            if let Some(error) = info.error {
                return Err(HarborError::Engine(format!("pull {} failed: {}", reference, error)));
            }
            if let Some(status) = info.status {
                self.output.detail(&status);
            }
        }

        match self.docker.inspect_image(reference).await {
            Ok(image) => Ok(Some(image.id.unwrap_or_else(|| reference.to_string()))),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn tag(&self, image: &str, reference: &str) -> Result<()> {
        let (repository, tag) = split_tag(reference);
        self.output.detail(&format!("Tagging {} as {}", image, reference));

        let options = TagImageOptions {
            repo: repository,
            tag,
        };
        self.docker
            .tag_image(image, Some(options))
            .await
            .map_err(|e| HarborError::Engine(format!("tag {} failed: {}", reference, e)))
    }

    async fn push(&self, reference: &str) -> Result<()> {
        let (repository, tag) = split_tag(reference);
        self.output.verbose(&format!("Pushing {}", reference));

        let options = PushImageOptions { tag };
        let mut stream = self
            .docker
            .push_image(repository, Some(options), self.credentials.clone());

        while let Some(info) = stream.next().await {
            let info = info
                .map_err(|e| HarborError::Engine(format!("push {} failed: {}", reference, e)))?;
            if let Some(error) = info.error {
                return Err(HarborError::Engine(format!("push {} failed: {}", reference, error)));
            }
            if let Some(status) = info.status {
                self.output.detail(&status);
            }
        }

        Ok(())
    }
}
