//! Image existence checks

use crate::error::{HarborError, Result};
use crate::image::ReferenceParser;
use crate::registry::{HarborClient, RepositoryOperations};

#[derive(Debug, Clone)]
pub enum CheckStatus {
    Present,
    Missing,
    /// The reference could not be parsed or looked up
    Failed(HarborError),
}

/// Per-reference results of a check run, in input order
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub entries: Vec<(String, CheckStatus)>,
}

impl CheckReport {
    pub fn present(&self) -> usize {
        self.count(|status| matches!(status, CheckStatus::Present))
    }

    pub fn missing(&self) -> usize {
        self.count(|status| matches!(status, CheckStatus::Missing))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, CheckStatus::Failed(_)))
    }

    pub fn is_clean(&self) -> bool {
        self.present() == self.entries.len()
    }

    fn count(&self, predicate: impl Fn(&CheckStatus) -> bool) -> usize {
        self.entries.iter().filter(|(_, status)| predicate(status)).count()
    }
}

pub struct ImageChecker<'a> {
    client: &'a HarborClient,
    parser: ReferenceParser,
}

impl<'a> ImageChecker<'a> {
    pub fn new(client: &'a HarborClient, parser: ReferenceParser) -> Self {
        Self { client, parser }
    }

    /// Whether the normalized form of `raw` has its tag in the registry
    pub async fn check_image(&self, raw: &str) -> Result<bool> {
        let reference = self.parser.normalize(raw)?;
        RepositoryOperations::new(self.client)
            .tag_exists(&reference.repository, &reference.tag)
            .await
    }

    /// Check every reference; a failing one is recorded and the rest still run
    pub async fn check_all(&self, references: &[String]) -> CheckReport {
        let mut report = CheckReport::default();

        for reference in references {
            let status = match self.check_image(reference).await {
                Ok(true) => CheckStatus::Present,
                Ok(false) => CheckStatus::Missing,
                Err(error) => CheckStatus::Failed(error),
            };
            report.entries.push((reference.clone(), status));
        }

        report
    }
}

/// One reference per line; blank lines and `#` comments are skipped
pub fn parse_reference_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
