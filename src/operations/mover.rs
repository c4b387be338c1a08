//! Image move/rename workflow
//!
//! A move is pull, retag, push, then deleting the old tag through the API.
//! Nothing is rolled back: when the push succeeds but the delete does not,
//! the image is left in both places. A source and target naming the same
//! `repository:tag` are refused before anything is pulled, since the final
//! delete would remove the tag that was just pushed.

use crate::engine::ContainerEngine;
use crate::error::{HarborError, Result};
use crate::image::{ImageReference, ReferenceParser, split_tag};
use crate::logging::Logger;
use crate::registry::{HarborClient, ProjectOperations, RepositoryOperations};
use reqwest::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: String, to: String },
    /// The engine pulled nothing; no tag, push or delete was attempted
    Skipped { reference: String },
}

#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub reference: String,
    pub error: HarborError,
}

/// Aggregated result of a multi-image sweep
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ImageMover<'a> {
    client: &'a HarborClient,
    engine: &'a dyn ContainerEngine,
    parser: ReferenceParser,
    output: Logger,
}

impl<'a> ImageMover<'a> {
    pub fn new(
        client: &'a HarborClient,
        engine: &'a dyn ContainerEngine,
        parser: ReferenceParser,
        output: Logger,
    ) -> Self {
        Self {
            client,
            engine,
            parser,
            output,
        }
    }

    /// Move `source` (a name inside the registry) to `target`
    pub async fn move_image(&self, source: &str, target: &str) -> Result<MoveOutcome> {
        self.output.step(&format!("Move {} to {}", source, target));
        let registry = self.client.registry_address();

        let (repository, tag) = split_tag(source);
        let target_name = ImageReference::parse(target)?.name();
        if format!("{}:{}", repository, tag) == target_name {
            return Err(HarborError::Validation(format!(
                "{} and {} name the same image {}",
                source, target, target_name
            )));
        }

        let pull_reference = format!("{}/{}", registry, source);
        let Some(image) = self.engine.pull(&pull_reference).await? else {
            self.output
                .warning(&format!("Pull of {} returned no image, skipping", pull_reference));
            return Ok(MoveOutcome::Skipped {
                reference: source.to_string(),
            });
        };

        let target_reference = self.parser.normalize(target)?;
        ProjectOperations::new(self.client)
            .ensure(&target_reference.project)
            .await?;

        let qualified = target_reference.qualified(registry);
        self.engine.tag(&image, &qualified).await?;
        self.engine.push(&qualified).await?;
        self.output.detail(&format!("Pushed {}", qualified));

        let status = RepositoryOperations::new(self.client)
            .delete_tag(repository, tag)
            .await?;
        if status != StatusCode::OK {
            self.output.warning(&format!(
                "{} was pushed but {}:{} could not be deleted, the image now exists twice",
                qualified, repository, tag
            ));
            return Err(HarborError::DeleteMismatch {
                reference: source.to_string(),
                status: status.as_u16(),
            });
        }

        self.output
            .success(&format!("Moved {} to {}", source, target_reference));
        Ok(MoveOutcome::Moved {
            from: source.to_string(),
            to: target_reference.name(),
        })
    }

    /// Run every move, recording failures instead of stopping at the first one
    pub async fn move_all<I>(&self, moves: I) -> BatchReport
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut report = BatchReport::default();

        for (source, target) in moves {
            report.attempted += 1;
            match self.move_image(&source, &target).await {
                Ok(MoveOutcome::Moved { .. }) => report.moved += 1,
                Ok(MoveOutcome::Skipped { .. }) => report.skipped += 1,
                Err(error) => {
                    self.output
                        .error(&format!("Move {} failed: {}", source, error));
                    report.failures.push(BatchFailure {
                        reference: source,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Move every repository of `project` nested deeper than `project/name`
    /// to its last two path segments
    pub async fn flatten(&self, project: &str) -> Result<BatchReport> {
        let project = ProjectOperations::new(self.client).find(project).await?;
        let repositories = RepositoryOperations::new(self.client)
            .list(project.project_id)
            .await?;

        let nested: Vec<String> = repositories
            .into_iter()
            .map(|repository| repository.name)
            .filter(|name| name.split('/').count() > 2)
            .collect();
        self.output
            .list(&format!("Nested repositories in {}", project.name), &nested);

        let moves = nested.into_iter().map(|source| {
            let target = flatten_target(&source);
            (source, target)
        });
        Ok(self.move_all(moves).await)
    }
}

/// `library/team/app` becomes `team/app`
pub fn flatten_target(name: &str) -> String {
    let segments: Vec<&str> = name.split('/').collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("/")
}
