//! Shared helpers: a client pointed at a wiremock registry and an in-memory engine

#![allow(dead_code)]

use async_trait::async_trait;
use harbor_ops::config::{AuthConfig, RegistryConfig};
use harbor_ops::engine::ContainerEngine;
use harbor_ops::error::{HarborError, Result};
use harbor_ops::image::{DomainLog, ReferenceParser};
use harbor_ops::logging::Logger;
use harbor_ops::registry::HarborClient;
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "Harbor12345";

pub fn registry_address(server: &MockServer) -> String {
    server.address().to_string()
}

pub fn client_for(server: &MockServer) -> HarborClient {
    HarborClient::builder(
        RegistryConfig::new(registry_address(server)).with_timeout(10),
        AuthConfig::new(USERNAME.to_string(), PASSWORD.to_string()),
    )
    .with_output(Logger::new_quiet())
    .build()
    .expect("client builds")
}

pub fn quiet_parser() -> ReferenceParser {
    ReferenceParser::new(DomainLog::disabled(), Logger::new_quiet())
}

/// Login endpoint accepting the credentials exactly `times` times
pub async fn mock_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/c/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

/// Every project reported as existing
pub async fn mock_projects_exist(server: &MockServer) {
    Mock::given(method("HEAD"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Engine double recording every call as `op argument`
#[derive(Default)]
pub struct FakeEngine {
    image: Option<String>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeEngine {
    pub fn with_image(id: &str) -> Self {
        Self {
            image: Some(id.to_string()),
            ..Default::default()
        }
    }

    /// Pulls produce nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pulls of references containing `fragment` fail
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn pull(&self, reference: &str) -> Result<Option<String>> {
        self.record(format!("pull {}", reference));
        if self.failing.iter().any(|f| reference.contains(f.as_str())) {
            return Err(HarborError::Engine(format!("manifest for {} not found", reference)));
        }
        Ok(self.image.clone())
    }

    async fn tag(&self, image: &str, reference: &str) -> Result<()> {
        self.record(format!("tag {} {}", image, reference));
        Ok(())
    }

    async fn push(&self, reference: &str) -> Result<()> {
        self.record(format!("push {}", reference));
        Ok(())
    }
}
