//! Command-line interface

mod links;
mod logging;
mod users;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

pub use links::LinksArgs;
pub use logging::setup_logging;
pub use users::UsersArgs;

use crate::services::config::{DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS};
use crate::services::{ApiConfig, DataLoaderService, ReportFetcher, ReportFilter, Scope, UsageSource};
use crate::tui::{self, Theme};
use crate::types::{Envelope, Result};

/// Per-user GitHub Copilot usage dashboard
#[derive(Parser, Debug)]
#[command(name = "copilot-usage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    /// Log filter directive (e.g. warn, debug, copilot_usage=trace)
    #[arg(long, env = "COPILOT_USAGE_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Metrics API connection settings
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Enterprise slug used for enterprise-scoped requests
    #[arg(long, env = "GITHUB_ENTERPRISE", default_value = "", global = true)]
    enterprise: String,

    /// Organization login used for organization-scoped requests
    #[arg(long, env = "GITHUB_ORGANIZATION", default_value = "", global = true)]
    organization: String,

    /// Access token with Copilot metrics read permission
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    token: String,

    /// REST API version header value
    #[arg(long, env = "GITHUB_API_VERSION", default_value = DEFAULT_API_VERSION, global = true)]
    api_version: String,

    /// "enterprise" or "organization" (anything else means organization)
    #[arg(long, env = "GITHUB_API_SCOPE", default_value = "organization", global = true)]
    scope: String,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "COPILOT_USAGE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,
}

impl ApiArgs {
    pub fn to_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            enterprise: self.enterprise.clone(),
            organization: self.organization.clone(),
            token: self.token.clone(),
            version: self.api_version.clone(),
            scope: Scope::from_setting(&self.scope),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Validated fetcher for remote calls
    pub fn fetcher(&self) -> Result<ReportFetcher> {
        let config = self.to_config();
        config.validate()?;
        Ok(ReportFetcher::new(config)?)
    }

    /// Loader reading `file` when given, the latest remote report otherwise
    pub fn loader(&self, file: Option<PathBuf>) -> Result<DataLoaderService> {
        let source = match file {
            Some(path) => UsageSource::File(path),
            None => UsageSource::Remote {
                fetcher: self.fetcher()?,
                filter: ReportFilter::default(),
            },
        };
        Ok(DataLoaderService::new(source))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui(TuiArgs),

    /// Print per-user totals for the latest 28-day report
    Users(UsersArgs),

    /// Print report download links
    Links(LinksArgs),
}

#[derive(Args, Debug, Default)]
struct TuiArgs {
    /// Read a downloaded NDJSON report instead of calling the API
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let interactive = matches!(self.command, None | Some(Commands::Tui(_)));
        setup_logging(&self.log_level, interactive)?;

        match self.command {
            None => run_tui(&self.api, TuiArgs::default()),
            Some(Commands::Tui(args)) => run_tui(&self.api, args),
            Some(Commands::Users(args)) => args.run(&self.api),
            Some(Commands::Links(args)) => args.run(&self.api),
        }
    }
}

fn run_tui(api: &ApiArgs, args: TuiArgs) -> anyhow::Result<()> {
    let loader = api.loader(args.file)?;
    // Detect before raw mode; the query needs a cooked terminal
    let theme = Theme::detect();
    tui::run(loader, theme)
}

/// Write an envelope as pretty JSON; a failure envelope still exits non-zero
fn write_envelope<T: Serialize>(
    out: &mut impl Write,
    envelope: &Envelope<T>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(envelope)?;
    writeln!(out, "{}", json)?;
    if let Some(message) = envelope.error_message() {
        anyhow::bail!("{}", message);
    }
    Ok(())
}

fn print_envelope<T: Serialize>(envelope: &Envelope<T>) -> anyhow::Result<()> {
    write_envelope(&mut std::io::stdout().lock(), envelope)
}
