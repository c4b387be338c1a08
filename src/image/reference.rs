//! Image reference normalization
//!
//! Turns user supplied names such as `nginx`, `team/app:1.2` or
//! `registry.example.com/team/app` into a `(project, repository, tag)` triple
//! addressed inside the configured registry.
//!
//! A leading path segment containing a `.` is treated as a registry domain and
//! stripped. This also matches project names that contain dots and single
//! segment references with a dotted tag (`nginx:1.19`), which are then
//! rejected because nothing is left after the "domain".

use crate::error::{HarborError, Result};
use crate::logging::Logger;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub const DEFAULT_PROJECT: &str = "library";
pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_DOMAIN_LOG: &str = "out/domain.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Registry domain stripped from the raw name, if any
    pub domain: Option<String>,
    pub project: String,
    /// Full repository path, including the project
    pub repository: String,
    pub tag: String,
}

impl ImageReference {
    /// Parse without touching the domain log
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(HarborError::Parse("image reference cannot be empty".to_string()));
        }

        let mut domain = None;
        let mut path = raw.to_string();

        if let Some((first, rest)) = raw.split_once('/') {
            if first.contains('.') {
                domain = Some(first.to_string());
                path = rest.to_string();
            }
        } else if raw.contains('.') {
            return Err(HarborError::Parse(format!(
                "{} looks like a registry domain with no repository after it",
                raw
            )));
        }

        if !path.contains('/') {
            path = format!("{}/{}", DEFAULT_PROJECT, path);
        }

        let (repository, tag) = split_tag(&path);
        let project = repository.split('/').next().unwrap_or_default();

        if project.is_empty() {
            return Err(HarborError::Parse(format!("{} has an empty project", raw)));
        }
        if repository.split('/').any(str::is_empty) {
            return Err(HarborError::Parse(format!("{} has an empty path segment", raw)));
        }
        if tag.is_empty() {
            return Err(HarborError::Parse(format!("{} has an empty tag", raw)));
        }

        Ok(Self {
            domain,
            project: project.to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
        })
    }

    /// `repository:tag`, the name relative to the registry
    pub fn name(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// `registry/repository:tag`, the name the engine tags and pushes
    pub fn qualified(&self, registry: &str) -> String {
        format!("{}/{}", registry, self.name())
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Split `repository[:tag]`, looking for the tag only in the final path segment
pub fn split_tag(name: &str) -> (&str, &str) {
    let segment_start = name.rfind('/').map(|pos| pos + 1).unwrap_or(0);
    match name[segment_start..].find(':') {
        Some(pos) => {
            let colon = segment_start + pos;
            (&name[..colon], &name[colon + 1..])
        }
        None => (name, DEFAULT_TAG),
    }
}

/// Append-only record of registry domains stripped during normalization
#[derive(Debug, Clone)]
pub struct DomainLog {
    path: Option<PathBuf>,
}

impl DomainLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn append(&self, domain: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", domain)?;
        Ok(())
    }
}

impl Default for DomainLog {
    fn default() -> Self {
        Self::new(DEFAULT_DOMAIN_LOG)
    }
}

/// Normalizes references and records stripped domains
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    domain_log: DomainLog,
    output: Logger,
}

impl ReferenceParser {
    pub fn new(domain_log: DomainLog, output: Logger) -> Self {
        Self { domain_log, output }
    }

    pub fn normalize(&self, raw: &str) -> Result<ImageReference> {
        let reference = ImageReference::parse(raw)?;

        if let Some(domain) = &reference.domain {
            self.output
                .detail(&format!("Stripped registry domain {} from {}", domain, raw));
            self.domain_log.append(domain)?;
        }

        self.output
            .debug(&format!("Normalized {} to {}", raw, reference.name()));
        Ok(reference)
    }
}
