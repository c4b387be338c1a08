//! Session login against the registry's web endpoint

use crate::config::AuthConfig;
use crate::error::handlers::NetworkErrorHandler;
use crate::error::{HarborError, Result};
use crate::logging::Logger;
use reqwest::Client;
use reqwest::cookie::Jar;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Authentication state owned by one client
///
/// The cookie jar is shared with the underlying HTTP client, so a successful
/// login is picked up by every later request. A session is not meant to be
/// shared between workers; each one builds its own client.
#[derive(Debug, Default)]
pub struct Session {
    jar: Arc<Jar>,
    logins: AtomicUsize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Number of successful logins performed through this session
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn is_established(&self) -> bool {
        self.login_count() > 0
    }

    fn record_login(&self) {
        self.logins.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct Auth {
    login_url: Url,
    credentials: AuthConfig,
}

impl Auth {
    pub fn new(login_url: Url, credentials: AuthConfig) -> Self {
        Self {
            login_url,
            credentials,
        }
    }

    /// Form-encoded login; any 2xx establishes the session cookie
    pub async fn login(&self, client: &Client, session: &Session, output: &Logger) -> Result<()> {
        output.verbose(&format!(
            "Logging in to {} as {}",
            self.login_url, self.credentials.username
        ));

        let form = [
            ("principal", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = client
            .post(self.login_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, "login"))?;

        let status = response.status();
        if !status.is_success() {
            output.error(&format!("Login rejected with status {}", status));
            return Err(HarborError::Auth(format!(
                "login failed with status {}, please check the registry credentials",
                status.as_u16()
            )));
        }

        session.record_login();
        output.success("Login success");
        Ok(())
    }
}
