//! Registry module for Harbor REST API interactions
//!
//! This module provides the session-aware client and the project and
//! repository operations built on top of it.

pub mod auth;
pub mod client;
pub mod projects;
pub mod repositories;

pub use crate::config::AuthConfig;
pub use auth::{Auth, Session};
pub use client::{HarborClient, HarborClientBuilder};
pub use projects::{Project, ProjectOperations};
pub use repositories::{Repository, RepositoryOperations};
