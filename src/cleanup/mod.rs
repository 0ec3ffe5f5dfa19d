//! Destructive cleanup of objects and everything staged for them.
//!
//! A run is validated and confirmed up front, then every druid is processed
//! in turn. Each selected step is attempted on its own; a failing step is
//! recorded against the druid and the run carries on. Nothing is rolled back.

mod prompt;

pub use prompt::{confirm_cleanup, is_affirmative, Prompter, ScriptedPrompter, TerminalPrompter};

use crate::batch::BatchReport;
use crate::config::DorConfig;
use crate::druid::Druid;
use crate::external::ssh::remove_tree_command;
use crate::external::{RemoteConnector, RemoteSession};
use crate::fs::FileSystemOperations;
use crate::services::Services;
use crate::telemetry::{create_batch_span, generate_correlation_id};
use crate::workflows;
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn, Instrument};

/// Named destructive actions; declaration order is execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CleanupStep {
    /// Error out assembly steps and delete the repository object
    Dor,
    /// Delete assembly and accession workflow records
    Workflows,
    /// Remove the search index document
    Index,
    /// Remove the workspace symlink
    Symlinks,
    /// Remove staged content in the assembly workspace
    Stage,
    /// Remove shelved files from the stacks host
    Stacks,
}

impl CleanupStep {
    pub const ALL: [CleanupStep; 6] = [
        CleanupStep::Dor,
        CleanupStep::Workflows,
        CleanupStep::Index,
        CleanupStep::Symlinks,
        CleanupStep::Stage,
        CleanupStep::Stacks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CleanupStep::Dor => "dor",
            CleanupStep::Workflows => "workflows",
            CleanupStep::Index => "index",
            CleanupStep::Symlinks => "symlinks",
            CleanupStep::Stage => "stage",
            CleanupStep::Stacks => "stacks",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches(':').to_lowercase();
        Self::ALL.into_iter().find(|step| step.name() == name)
    }

    /// What the step destroys, shown when asking for confirmation
    pub fn description(&self, config: &DorConfig) -> String {
        match self {
            CleanupStep::Dor => "This will delete objects from Fedora".to_string(),
            CleanupStep::Workflows => "This will delete the assemblyWF and accessionWF workflow records".to_string(),
            CleanupStep::Index => "This will remove the objects from the search index".to_string(),
            CleanupStep::Symlinks => format!("This will remove the symlink from {}", config.workspace.dor.display()),
            CleanupStep::Stage => format!(
                "This will delete the staged content in {}",
                config.workspace.assembly.display()
            ),
            CleanupStep::Stacks => "This will remove all files from the stacks that were shelved for the objects".to_string(),
        }
    }
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Recognised steps in execution order, without duplicates.
///
/// Unknown names are dropped with a warning.
pub fn select_steps<S: AsRef<str>>(names: &[S]) -> Vec<CleanupStep> {
    let mut steps: Vec<CleanupStep> = names
        .iter()
        .filter_map(|name| {
            let step = CleanupStep::from_name(name.as_ref());
            if step.is_none() {
                warn!(step = name.as_ref(), "ignoring unknown cleanup step");
            }
            step
        })
        .collect();
    steps.sort();
    steps.dedup();
    steps
}

/// Reasons a cleanup run stops before touching any object
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("no valid steps specified for cleanup")]
    NoValidSteps,
    #[error("no druids provided")]
    NoIdentifiers,
    #[error("cleanup stopped, operator declined: {prompt}")]
    Declined { prompt: String },
    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Runs cleanup batches against the configured services and hosts
pub struct CleanupRunner<'a> {
    config: &'a DorConfig,
    services: &'a Services,
    fs: Arc<dyn FileSystemOperations>,
    connector: Arc<dyn RemoteConnector>,
}

impl<'a> CleanupRunner<'a> {
    pub fn new(
        config: &'a DorConfig,
        services: &'a Services,
        fs: Arc<dyn FileSystemOperations>,
        connector: Arc<dyn RemoteConnector>,
    ) -> Self {
        Self {
            config,
            services,
            fs,
            connector,
        }
    }

    /// Validate, confirm, then clean up every druid.
    ///
    /// Precondition failures are returned before any prompt or any object is
    /// touched; per-druid failures end up in the report.
    pub async fn run<I: AsRef<str>, S: AsRef<str>>(
        &self,
        ids: &[I],
        step_names: &[S],
        dry_run: bool,
        prompter: &mut dyn Prompter,
    ) -> Result<BatchReport, CleanupError> {
        let steps = select_steps(step_names);
        if steps.is_empty() {
            return Err(CleanupError::NoValidSteps);
        }
        if ids.is_empty() {
            return Err(CleanupError::NoIdentifiers);
        }

        if dry_run {
            println!("THIS IS A DRY RUN");
        }
        confirm_cleanup(prompter, self.config, &steps)?;

        Ok(self.execute(ids, &steps, dry_run).await)
    }

    /// Clean up each druid with the already confirmed steps.
    ///
    /// An id that does not parse is a failure of that item only.
    pub async fn execute<I: AsRef<str>>(&self, ids: &[I], steps: &[CleanupStep], dry_run: bool) -> BatchReport {
        let correlation_id = generate_correlation_id();
        let span = create_batch_span("cleanup", ids.len(), &correlation_id);

        async {
            let mut report = BatchReport::new("cleanup");
            let mut session: Option<Box<dyn RemoteSession>> = None;

            for id in ids {
                let druid = match Druid::parse(id.as_ref()) {
                    Ok(druid) => druid,
                    Err(err) => {
                        println!("** cleaning up failed for {} with {err}", id.as_ref());
                        report.failed(id.as_ref(), err);
                        continue;
                    }
                };
                println!("Cleaning up {druid}");
                let mut done = Vec::new();
                let mut errors = Vec::new();

                for step in steps {
                    match self.run_step(&druid, *step, dry_run, &mut session).await {
                        Ok(action) => done.push(action),
                        Err(err) => {
                            println!("** cleaning up {step} failed for {druid} with {err:#}");
                            errors.push(format!("{step}: {err:#}"));
                        }
                    }
                }

                if errors.is_empty() {
                    report.succeeded(druid.qualified(), done.join("; "));
                } else {
                    report.failed(druid.qualified(), errors.join("; "));
                }
            }

            if let Some(session) = session.take() {
                let destination = session.destination().to_string();
                match session.close().await {
                    Ok(()) => info!(destination = %destination, "closed remote session"),
                    Err(err) => warn!(destination = %destination, error = %err, "failed to close remote session"),
                }
            }

            report.finish()
        }
        .instrument(span)
        .await
    }

    fn symlink_path(&self, druid: &Druid) -> PathBuf {
        druid.path(&self.config.workspace.dor)
    }

    fn stage_path(&self, druid: &Druid) -> PathBuf {
        druid.path(&self.config.workspace.assembly)
    }

    fn stacks_path(&self, druid: &Druid) -> PathBuf {
        druid.path(&self.config.stacks.root)
    }

    async fn run_step(
        &self,
        druid: &Druid,
        step: CleanupStep,
        dry_run: bool,
        session: &mut Option<Box<dyn RemoteSession>>,
    ) -> Result<String> {
        match step {
            CleanupStep::Dor => {
                println!("-- deleting {druid} from Fedora {}", self.config.environment);
                if !dry_run {
                    workflows::unregister(self.services, druid).await?;
                }
                Ok("deleted from Fedora".to_string())
            }
            CleanupStep::Workflows => {
                println!("-- deleting workflows for {druid}");
                if !dry_run {
                    workflows::delete_workflows(self.services, druid).await?;
                }
                Ok("deleted workflows".to_string())
            }
            CleanupStep::Index => {
                println!("-- removing {druid} from the search index");
                if !dry_run {
                    self.services.search.delete_document(&druid.qualified()).await?;
                    self.services.search.commit().await?;
                }
                Ok("removed from index".to_string())
            }
            CleanupStep::Symlinks => {
                let path = self.symlink_path(druid);
                println!("-- deleting symlink {}", path.display());
                if !dry_run && self.fs.exists(&path) {
                    self.fs
                        .remove_file(&path)
                        .await
                        .with_context(|| format!("Failed to delete symlink {}", path.display()))?;
                }
                Ok(format!("removed {}", path.display()))
            }
            CleanupStep::Stage => {
                let path = self.stage_path(druid);
                println!("-- deleting folder {}", path.display());
                if !dry_run && self.fs.exists(&path) {
                    self.fs
                        .remove_dir_all(&path)
                        .await
                        .with_context(|| format!("Failed to delete folder {}", path.display()))?;
                }
                Ok(format!("removed {}", path.display()))
            }
            CleanupStep::Stacks => {
                let path = self.stacks_path(druid);
                let host = self.config.stacks_host();
                println!("-- removing files from the stacks on {host} at {}", path.display());
                if !dry_run {
                    if session.is_none() {
                        let opened = self.connector.connect(host, &self.config.stacks.user).await?;
                        info!(destination = opened.destination(), "opened remote session");
                        *session = Some(opened);
                    }
                    if let Some(session) = session.as_mut() {
                        session.exec(&remove_tree_command(&path)).await?;
                    }
                }
                Ok(format!("removed {host}:{}", path.display()))
            }
        }
    }
}
