//! CLI route: single route table and run context. Dispatches to the workflow and presentation.

use crate::cli::input::{load_notes, load_transcript};
use crate::cli::output::CliError;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_config_show, format_config_validation, format_plan_json, format_run_json,
    format_run_text,
};
use crate::config::{ConfigLoader, MemoflowConfig};
use crate::error::ApiError;
use crate::workflow::Orchestrator;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace and merged configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: MemoflowConfig,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: MemoflowConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &MemoflowConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, CliError> {
        match command {
            Commands::Run {
                transcript,
                notes,
                format,
                timeout_secs,
            } => self.handle_run(transcript, notes.as_deref(), format, *timeout_secs),
            Commands::Plan { transcript, notes } => self.handle_plan(transcript, notes.as_deref()),
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    fn handle_run(
        &self,
        transcript: &Path,
        notes: Option<&Path>,
        format: &str,
        timeout_secs: Option<u64>,
    ) -> Result<String, CliError> {
        if format != "text" && format != "json" {
            return Err(ApiError::InvalidInput(format!(
                "Unknown output format '{}', expected text or json",
                format
            ))
            .into());
        }
        let messages = load_transcript(&self.resolve(transcript))?;
        let notes = load_notes(notes.map(|p| self.resolve(p)).as_deref())?;

        let mut orchestrator = self.orchestrator()?;
        if let Some(secs) = timeout_secs {
            orchestrator = orchestrator.with_timeout(Some(Duration::from_secs(secs)));
        }

        let runtime = build_runtime()?;
        let report = runtime.block_on(async {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received; cancelling run");
                    on_interrupt.cancel();
                }
            });
            let report = orchestrator.run_with_report(&messages, &notes, cancel).await;
            watcher.abort();
            report
        })?;
        info!(
            files = report.result.files.len(),
            cancelled = report.result.cancelled,
            "Run finished"
        );

        let output = if format == "json" {
            format_run_json(&report.result)?
        } else {
            format_run_text(&report)
        };
        if report.result.cancelled {
            return Err(CliError::Stopped { output });
        }
        Ok(output)
    }

    fn handle_plan(&self, transcript: &Path, notes: Option<&Path>) -> Result<String, CliError> {
        let messages = load_transcript(&self.resolve(transcript))?;
        let notes = load_notes(notes.map(|p| self.resolve(p)).as_deref())?;
        let orchestrator = self.orchestrator()?;

        let runtime = build_runtime()?;
        let (plan, source) = runtime.block_on(orchestrator.plan(&messages, &notes))?;
        Ok(format_plan_json(&plan, source)?)
    }

    fn handle_config_command(&self, command: &ConfigCommands) -> Result<String, CliError> {
        match command {
            ConfigCommands::Validate => match self.config.validate() {
                Ok(()) => Ok(format_config_validation(&self.config, &[])),
                Err(errors) => Err(CliError::InvalidConfig(errors)),
            },
            ConfigCommands::Show => Ok(format_config_show(&self.config)?),
        }
    }

    fn orchestrator(&self) -> Result<Orchestrator, CliError> {
        self.config.validate().map_err(CliError::InvalidConfig)?;
        Ok(Orchestrator::from_config(&self.config)?)
    }

    /// Relative input paths resolve against the workspace root.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime, ApiError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ApiError::Io)
}
