//! Container engine seam
//!
//! The mover never transfers image data itself; pulls, tags and pushes go
//! through a [`ContainerEngine`]. [`DockerEngine`] talks to the local Docker
//! daemon; tests substitute an in-memory engine.

pub mod docker;

use crate::error::Result;
use async_trait::async_trait;

pub use docker::DockerEngine;

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Pull `reference` and return the local image id, or `None` when the
    /// engine finished without producing an image
    async fn pull(&self, reference: &str) -> Result<Option<String>>;

    /// Point `reference` at an already present local image
    async fn tag(&self, image: &str, reference: &str) -> Result<()>;

    async fn push(&self, reference: &str) -> Result<()>;
}
