// HarborClient issues requests against the registry's REST API. Every call
// goes through `send_with_auth`, which logs in again once when the session
// has expired and replays the request exactly once.

use crate::config::{AuthConfig, RegistryConfig};
use crate::error::handlers::NetworkErrorHandler;
use crate::error::{HarborError, Result};
use crate::logging::Logger;
use crate::registry::auth::{Auth, Session};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

/// Re-logins allowed per call before a 401 becomes fatal
const MAX_RELOGINS: usize = 1;

pub struct HarborClientBuilder {
    registry: RegistryConfig,
    auth_config: AuthConfig,
    output: Logger,
}

impl HarborClientBuilder {
    pub fn new(registry: RegistryConfig, auth_config: AuthConfig) -> Self {
        Self {
            registry,
            auth_config,
            output: Logger::new(false),
        }
    }

    pub fn with_output(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<HarborClient> {
        let session = Session::new();

        let mut builder = Client::builder()
            .cookie_provider(session.cookie_jar())
            .timeout(self.registry.timeout_duration());

        if self.registry.insecure {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let http = builder
            .build()
            .map_err(|e| HarborError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let api_base = self.registry.api_url()?;
        let auth = Auth::new(self.registry.login_url()?, self.auth_config);

        Ok(HarborClient {
            http,
            registry: self.registry,
            api_base,
            auth,
            session,
            output: self.output,
        })
    }
}

pub struct HarborClient {
    http: Client,
    registry: RegistryConfig,
    api_base: Url,
    auth: Auth,
    session: Session,
    output: Logger,
}

impl HarborClient {
    pub fn builder(registry: RegistryConfig, auth_config: AuthConfig) -> HarborClientBuilder {
        HarborClientBuilder::new(registry, auth_config)
    }

    /// Bare `host[:port]` of the registry, the prefix of engine image names
    pub fn registry_address(&self) -> &str {
        &self.registry.address
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    /// Resolve a path relative to `<base>/api/`
    pub fn api_url(&self, path: &str) -> Result<Url> {
        Ok(self.api_base.join(path)?)
    }

    /// Resolve a path with query parameters relative to `<base>/api/`
    pub fn api_url_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.api_url(path)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    pub async fn login(&self) -> Result<()> {
        self.auth.login(&self.http, &self.session, &self.output).await
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        self.send_with_auth(Method::GET, url, None).await
    }

    pub async fn head(&self, url: Url) -> Result<Response> {
        self.send_with_auth(Method::HEAD, url, None).await
    }

    pub async fn post_json(&self, url: Url, body: &Value) -> Result<Response> {
        self.send_with_auth(Method::POST, url, Some(body)).await
    }

    pub async fn delete(&self, url: Url) -> Result<Response> {
        self.send_with_auth(Method::DELETE, url, None).await
    }

    async fn send_with_auth(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Response> {
        let context = format!("{} {}", method, url.path());
        let mut relogins = 0;

        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            self.output.debug(&format!("{} {}", method, url));
            let response = request
                .send()
                .await
                .map_err(|e| NetworkErrorHandler::handle_network_error(&e, &context))?;

            if response.status() != StatusCode::UNAUTHORIZED {
                self.output
                    .debug(&format!("{} -> {}", context, response.status()));
                return Ok(response);
            }

            if relogins >= MAX_RELOGINS {
                self.output
                    .error(&format!("{} still unauthorized after login", context));
                return Err(HarborError::Unauthorized(context));
            }

            self.output
                .verbose(&format!("{} unauthorized, trying to login", context));
            self.login().await?;
            relogins += 1;
        }
    }
}
