//! Error types for registry, engine and workflow operations

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarborError>;

#[derive(Debug, Clone, Error)]
pub enum HarborError {
    /// Transport level failures talking to the registry
    #[error("Network error: {0}")]
    Network(String),
    /// Login endpoint rejected the stored credentials
    #[error("Authentication error: {0}")]
    Auth(String),
    /// Request still unauthorized after a fresh login
    #[error("Unauthorized after re-login: {0}")]
    Unauthorized(String),
    #[error("create project {project} failed (status {status})")]
    ProjectCreate { project: String, status: u16 },
    #[error("project {0} does not exist")]
    ProjectNotFound(String),
    /// Stale tag could not be removed after the image was pushed
    #[error("delete {reference} failed (status {status})")]
    DeleteMismatch { reference: String, status: u16 },
    /// Container engine errors (pull, tag, push)
    #[error("Engine error: {0}")]
    Engine(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<std::io::Error> for HarborError {
    fn from(err: std::io::Error) -> Self {
        HarborError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HarborError {
    fn from(err: serde_json::Error) -> Self {
        HarborError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for HarborError {
    fn from(err: reqwest::Error) -> Self {
        handlers::NetworkErrorHandler::handle_network_error(&err, "registry request")
    }
}

impl From<url::ParseError> for HarborError {
    fn from(err: url::ParseError) -> Self {
        HarborError::Validation(err.to_string())
    }
}

impl From<bollard::errors::Error> for HarborError {
    fn from(err: bollard::errors::Error) -> Self {
        HarborError::Engine(err.to_string())
    }
}
