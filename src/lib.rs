//! Harbor Operations Library
//!
//! This file serves as the library root for the harbor-ops crate,
//! organizing and exposing the modules that make up the application.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod image;
pub mod logging;
pub mod operations;
pub mod registry;

pub use config::{AppConfig, AuthConfig, RegistryConfig};
pub use engine::ContainerEngine;
pub use error::{HarborError, Result};
pub use image::{ImageReference, ReferenceParser};
pub use logging::Logger;
pub use operations::{BatchReport, ImageMover, MoveOutcome};
pub use registry::HarborClient;
