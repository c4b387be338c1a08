//! Command-line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "harbor-ops")]
#[command(about = "Bootstrap Harbor projects and move, rename or check images")]
#[command(version)]
pub struct Args {
    /// Registry address
    #[arg(
        long = "registry",
        short = 'r',
        global = true,
        help = "Registry host[:port], without scheme"
    )]
    pub registry: Option<String>,

    #[arg(
        long = "username",
        short = 'u',
        global = true,
        help = "Username for registry authentication"
    )]
    pub username: Option<String>,

    #[arg(
        long = "password",
        short = 'p',
        global = true,
        help = "Password for registry authentication"
    )]
    pub password: Option<String>,

    #[arg(long = "tls", global = true, help = "Use https for registry API calls")]
    pub tls: bool,

    #[arg(
        long = "no-tls",
        global = true,
        conflicts_with = "tls",
        help = "Use plain http even if the config file enables tls"
    )]
    pub no_tls: bool,

    /// Certificates are not verified unless asked for
    #[arg(
        long = "verify-tls",
        global = true,
        help = "Verify registry TLS certificates (default trusts self-signed registries)"
    )]
    pub verify_tls: bool,

    #[arg(
        long = "timeout",
        short = 't',
        global = true,
        help = "Timeout for registry and engine calls in seconds"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "domain-log",
        global = true,
        help = "File that records registry domains stripped from image names"
    )]
    pub domain_log: Option<PathBuf>,

    #[arg(long = "no-domain-log", global = true, help = "Do not record stripped domains")]
    pub no_domain_log: bool,

    #[arg(long = "config", short = 'c', global = true, help = "Path to a JSON configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long = "verbose", short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long = "quiet", short = 'q', global = true, help = "Only print errors and results")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Verify the credentials against the registry
    Login,
    /// Create a public project unless it already exists
    EnsureProject {
        name: String,
    },
    /// Move or rename an image inside the registry
    Move {
        /// Source name inside the registry, e.g. library/team/app:1.0
        source: String,
        /// Target name, normalized before pushing
        target: String,
    },
    /// Move nested repositories of a project to their last two path segments
    Flatten {
        project: String,
    },
    /// Report whether images exist in the registry
    Check {
        references: Vec<String>,
        #[arg(long = "file", short = 'f', help = "File with one image reference per line")]
        file: Option<PathBuf>,
    },
    /// Print the normalized form of image names without contacting the registry
    Normalize {
        #[arg(required = true)]
        references: Vec<String>,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Fill unset options from `HARBOR_*` environment variables
    pub fn from_env(self) -> Self {
        self.merge_env(|key| std::env::var(key).ok())
    }

    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let truthy = |value: String| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");

        if self.registry.is_none() {
            self.registry = lookup("HARBOR_URL");
        }

        if self.username.is_none() {
            self.username = lookup("HARBOR_USERNAME");
        }

        if self.password.is_none() {
            self.password = lookup("HARBOR_PASSWORD");
        }

        if self.timeout.is_none() {
            self.timeout = lookup("HARBOR_TIMEOUT").and_then(|t| t.parse().ok());
        }

        if self.domain_log.is_none() {
            self.domain_log = lookup("HARBOR_DOMAIN_LOG").map(PathBuf::from);
        }

        if !self.tls && !self.no_tls {
            self.tls = lookup("HARBOR_TLS").is_some_and(truthy);
        }

        if !self.verify_tls {
            self.verify_tls = lookup("HARBOR_VERIFY_TLS").is_some_and(truthy);
        }

        self
    }
}
