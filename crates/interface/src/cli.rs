//! CLI - Command Line Interface
//!
//! Build-step entry point: patch one properties file in the workspace.
//!
//! ```text
//! propinject -f conf/app.properties -p $'db.url=jdbc:...\nfeature.x=on'
//! propinject -f conf/app.properties -s host=prod.example.com -s port=443
//! propinject -c inject.yaml --output json
//! ```
//!
//! The workspace root comes from `--workspace`, then `$WORKSPACE` (set by
//! the CI system), then the current directory.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use propinject_core::{InjectConfig, MatchMode, WORKSPACE_ENV};
use propinject_runtime::{
    BuildLog, ConsoleLog, ConsoleStream, PatchStatus, PatchSummary, TracingLog, apply_config,
};

/// CLI Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Patch failed: {0}")]
    Patch(String),

    #[error("Output error: {0}")]
    Output(String),
}

/// CLI Configuration
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Injection job
    pub job: InjectConfig,

    /// Verbose output
    pub verbose: bool,

    /// Output format
    pub output_format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            job: InjectConfig::default(),
            verbose: false,
            output_format: OutputFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Minimal,
    /// Build log lines as `tracing` events on stderr
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub(crate) enum MatchModeArg {
    /// Key may appear anywhere in the file
    Legacy,
    /// Key must start a line and be followed by ':' or '='
    Anchored,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Legacy => MatchMode::Legacy,
            MatchModeArg::Anchored => MatchMode::Anchored,
        }
    }
}

/// Inject property file
#[derive(Parser, Debug)]
#[command(name = "propinject")]
#[command(author, version, about = "Inject property file", long_about = None)]
pub(crate) struct Cli {
    /// Workspace root (defaults to $WORKSPACE, then the current directory)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Target file, relative to the workspace
    #[arg(short, long)]
    pub file: Option<String>,

    /// Directive block, one key=value or key:value per line
    #[arg(short, long, conflicts_with = "properties_file")]
    pub properties: Option<String>,

    /// Read the directive block from a file
    #[arg(long)]
    pub properties_file: Option<PathBuf>,

    /// Single directive, appended after the block (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// YAML job file; flags override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Key matching mode
    #[arg(long, value_enum)]
    pub mode: Option<MatchModeArg>,

    /// Report what would change without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl CliConfig {
    /// Merge the optional job file with command line flags.
    pub(crate) fn from_cli(cli: Cli) -> Result<Self, CliError> {
        let mut job = match &cli.config {
            Some(path) => InjectConfig::load(path).map_err(|e| CliError::Config(e.to_string()))?,
            None => InjectConfig::default(),
        };

        if let Some(workspace) = cli.workspace {
            job.workspace = Some(workspace);
        }
        if let Some(file) = cli.file {
            job.file_path = file;
        }
        if let Some(properties) = cli.properties {
            job.injected_properties = properties;
        }
        if let Some(path) = &cli.properties_file {
            job.injected_properties = std::fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("cannot read {}: {e}", path.display()))
            })?;
        }
        if !cli.set.is_empty() {
            let mut lines: Vec<&str> = Vec::with_capacity(cli.set.len() + 1);
            if !job.injected_properties.is_empty() {
                lines.push(job.injected_properties.trim_end());
            }
            lines.extend(cli.set.iter().map(String::as_str));
            job.injected_properties = lines.join("\n");
        }
        if let Some(mode) = cli.mode {
            job.match_mode = mode.into();
        }
        job.dry_run |= cli.dry_run;

        // validation errors surface here, before any file is touched
        job.validate().map_err(|e| CliError::Config(e.to_string()))?;

        Ok(Self {
            job,
            verbose: cli.verbose,
            output_format: cli.output.unwrap_or(OutputFormat::Pretty),
        })
    }

    fn build_log(&self) -> Arc<dyn BuildLog> {
        match self.output_format {
            OutputFormat::Pretty => Arc::new(ConsoleLog::new(ConsoleStream::Stdout)),
            OutputFormat::Minimal => Arc::new(ConsoleLog::new(ConsoleStream::Stdout).warnings_only()),
            OutputFormat::Json => Arc::new(ConsoleLog::new(ConsoleStream::Stderr)),
            OutputFormat::Log => Arc::new(TracingLog),
        }
    }

    /// Subscriber level, or `None` when no subscriber is needed
    pub(crate) fn tracing_level(&self) -> Option<tracing::Level> {
        if self.verbose {
            Some(tracing::Level::DEBUG)
        } else if self.output_format == OutputFormat::Log {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

/// Parse CLI arguments and run the injection
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(cli)?;

    if let Some(level) = config.tracing_level() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init();
    }

    let env_workspace = std::env::var(WORKSPACE_ENV).ok();
    debug!(job = ?config.job, env_workspace = ?env_workspace, "resolved job");

    let summary = apply_config(&config.job, env_workspace.as_deref(), config.build_log())
        .map_err(|e| CliError::Patch(e.to_string()))?;

    if let Some(text) = render_summary(&summary, config.output_format)? {
        println!("{text}");
    }

    Ok(())
}

/// Final report line(s) for the given format. `None` when there is nothing
/// to add beyond the build log.
pub(crate) fn render_summary(
    summary: &PatchSummary,
    format: OutputFormat,
) -> Result<Option<String>, CliError> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(summary)
            .map(Some)
            .map_err(|e| CliError::Output(e.to_string()));
    }

    let suffix = match summary.status {
        PatchStatus::FileMissing => return Ok(None),
        PatchStatus::Patched => "",
        PatchStatus::DryRun => " (dry run, file not written)",
    };

    Ok(Some(format!(
        "{} replaced, {} not found{}",
        summary.replaced_count(),
        summary.not_found_count(),
        suffix
    )))
}
