//! Runner that turns parsed arguments into configured components and
//! dispatches the selected command

use crate::cli::args::{Args, Command};
use crate::config::{AppConfig, AuthConfig, RegistryConfig};
use crate::engine::DockerEngine;
use crate::error::{HarborError, Result};
use crate::image::{DomainLog, ImageReference, ReferenceParser};
use crate::logging::Logger;
use crate::operations::{
    BatchReport, CheckReport, CheckStatus, ImageChecker, ImageMover, MoveOutcome,
    parse_reference_list,
};
use crate::registry::{HarborClient, ProjectOperations};
use std::process::ExitCode;
use std::time::Instant;

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };

        Self { args, output }
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    /// Runs the command; `Ok(FAILURE)` means it ran but found failures or missing images
    pub async fn run(&self) -> Result<ExitCode> {
        let start_time = Instant::now();

        let code = match &self.args.command {
            Command::Normalize { references } => self.normalize(references)?,
            command => {
                let config = self.app_config()?;
                let client = self.create_client(&config, self.logger_for(&config))?;
                self.dispatch(command, &config, &client).await?
            }
        };

        self.output.verbose(&format!(
            "Finished in {}",
            self.output.format_duration(start_time.elapsed())
        ));
        Ok(code)
    }

    /// Config file first, then command line and environment on top
    pub fn app_config(&self) -> Result<AppConfig> {
        let args = &self.args;

        let mut config = match &args.config {
            Some(path) => AppConfig::from_file(path)?,
            None => {
                let address = args.registry.clone().unwrap_or_default();
                AppConfig::new(
                    RegistryConfig::new(address),
                    AuthConfig::new(
                        args.username.clone().unwrap_or_default(),
                        args.password.clone().unwrap_or_default(),
                    ),
                )
            }
        };

        if let Some(address) = &args.registry {
            config.registry.address = address.clone();
        }
        if let Some(username) = &args.username {
            config.auth.username = username.clone();
        }
        if let Some(password) = &args.password {
            config.auth.password = password.clone();
        }
        if let Some(timeout) = args.timeout {
            config.registry.timeout = timeout;
        }
        if args.tls {
            config.registry.tls = true;
        }
        if args.no_tls {
            config.registry.tls = false;
        }
        if args.verify_tls {
            config.registry.insecure = false;
        }
        if let Some(path) = &args.domain_log {
            config.domain_log = Some(path.clone());
        }
        if args.no_domain_log {
            config.domain_log = None;
        }
        config.verbose |= args.verbose;

        config.validate()?;
        Ok(config)
    }

    /// Logger for registry commands; `verbose` may also come from the config file
    pub fn logger_for(&self, config: &AppConfig) -> Logger {
        if self.args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(config.verbose)
        }
    }

    fn parser(&self, domain_log: Option<&std::path::Path>, output: &Logger) -> ReferenceParser {
        let log = match domain_log {
            Some(path) => DomainLog::new(path),
            None => DomainLog::disabled(),
        };
        ReferenceParser::new(log, output.clone())
    }

    fn create_client(&self, config: &AppConfig, output: Logger) -> Result<HarborClient> {
        output.detail(&format!(
            "Registry: {}://{} (certificate verification {})",
            config.registry.scheme(),
            config.registry.address,
            if config.registry.insecure { "off" } else { "on" }
        ));
        HarborClient::builder(config.registry.clone(), config.auth.clone())
            .with_output(output)
            .build()
    }

    fn create_engine(&self, config: &AppConfig, output: &Logger) -> Result<DockerEngine> {
        Ok(
            DockerEngine::connect(config.registry.timeout_duration(), output.clone())?
                .with_credentials(&config.auth, &config.registry.address),
        )
    }

    async fn dispatch(
        &self,
        command: &Command,
        config: &AppConfig,
        client: &HarborClient,
    ) -> Result<ExitCode> {
        let output = client.output();
        let parser = self.parser(config.domain_log.as_deref(), output);

        match command {
            Command::Login => {
                client.login().await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::EnsureProject { name } => {
                ProjectOperations::new(client).ensure(name).await?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Move { source, target } => {
                output.section("Move image");
                let engine = self.create_engine(config, output)?;
                let mover = ImageMover::new(client, &engine, parser, output.clone());
                match mover.move_image(source, target).await? {
                    MoveOutcome::Moved { from, to } => {
                        output.info(&format!("{} is now {}", from, to));
                    }
                    MoveOutcome::Skipped { reference } => {
                        output.info(&format!("Nothing pulled for {}, no changes made", reference));
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Flatten { project } => {
                output.section(&format!("Flatten project {}", project));
                let engine = self.create_engine(config, output)?;
                let mover = ImageMover::new(client, &engine, parser, output.clone());
                let report = mover.flatten(project).await?;
                print_batch_report(output, &report);
                Ok(if report.is_clean() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Command::Check { references, file } => {
                let mut references = references.clone();
                if let Some(path) = file {
                    let contents = std::fs::read_to_string(path).map_err(|e| {
                        HarborError::Io(format!("Failed to read {}: {}", path.display(), e))
                    })?;
                    references.extend(parse_reference_list(&contents));
                }
                if references.is_empty() {
                    return Err(HarborError::Validation(
                        "No image references given (pass names or --file)".to_string(),
                    ));
                }

                let report = ImageChecker::new(client, parser)
                    .check_all(&references)
                    .await;
                print_check_report(output, &report);
                Ok(if report.is_clean() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Command::Normalize { references } => self.normalize(references),
        }
    }

    fn normalize(&self, references: &[String]) -> Result<ExitCode> {
        for raw in references {
            let reference = ImageReference::parse(raw)?;
            let domain = reference.domain.as_deref().unwrap_or("-");
            println!(
                "{}\tproject={}\trepository={}\ttag={}\tdomain={}",
                raw, reference.project, reference.repository, reference.tag, domain
            );
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_batch_report(output: &Logger, report: &BatchReport) {
    output.summary_kv(
        "Flatten summary",
        &[
            ("Attempted", report.attempted.to_string()),
            ("Moved", report.moved.to_string()),
            ("Skipped", report.skipped.to_string()),
            ("Failed", report.failures.len().to_string()),
        ],
    );

    for failure in &report.failures {
        output.error(&format!("{}: {}", failure.reference, failure.error));
    }
}

/// One `status<TAB>reference` line per input, then the summary
fn print_check_report(output: &Logger, report: &CheckReport) {
    for (reference, status) in &report.entries {
        match status {
            CheckStatus::Present => println!("present\t{}", reference),
            CheckStatus::Missing => println!("missing\t{}", reference),
            CheckStatus::Failed(error) => {
                println!("error\t{}", reference);
                output.error(&format!("{}: {}", reference, error));
            }
        }
    }

    output.summary_kv(
        "Check summary",
        &[
            ("Checked", report.entries.len().to_string()),
            ("Missing", report.missing().to_string()),
            ("Failed", report.failed().to_string()),
        ],
    );
}
