//! Command line interface module
//!
//! This module provides argument parsing, environment overrides and the
//! runner that wires the registry client, engine and workflows together.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
