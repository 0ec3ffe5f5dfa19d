use crate::config::{DorConfig, DorEnvironment};
use crate::reports::ReportWorkflow;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use commands::{
    cleanup::CleanupCommand,
    datastream::{ReplaceDatastreamCommand, UpdateDatastreamCommand, UpdateRightsCommand},
    files::{ProgressLogCommand, ReadConfigCommand},
    init::InitConfigCommand,
    lookup::{LookupCommand, StagingPathCommand},
    report::{CompletionReportCommand, WorkflowStatusCommand},
    robots::RobotsCommand,
    transfer::{ExportCommand, ImportCommand, RepublishCommand},
    workflow::{
        ClearStrayWorkflowsCommand, DeleteCommand, ResetWorkflowsCommand, SetErrorCommand, StepStatusCommand,
        UnregisterCommand,
    },
};

#[derive(Parser)]
#[command(name = "dor-admin")]
#[command(version)]
#[command(about = "Administrative utilities for the digital object repository")]
#[command(long_about = "dor-admin looks up objects, inspects and resets workflow steps, cleans up \
                       objects and their staged files, edits datastreams in bulk and produces CSV \
                       status reports against the repository services of one environment.")]
pub struct Cli {
    /// Explicit configuration file layered over the defaults
    #[arg(long, global = true, help = "Configuration file (TOML) to load")]
    pub config: Option<PathBuf>,
    /// Environment whose services are targeted
    #[arg(long, global = true, help = "development, test or production")]
    pub environment: Option<DorEnvironment>,
    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the sharded staging directory for a druid
    StagingPath {
        druid: String,
        /// Directory to prefix the staging path with
        #[arg(long)]
        base: Option<PathBuf>,
    },
    /// Find druids for external source ids
    Lookup {
        #[arg(required = true)]
        source_ids: Vec<String>,
    },
    /// Show the status of one workflow step for a druid
    StepStatus {
        druid: String,
        #[arg(long, default_value = "assemblyWF")]
        workflow: String,
        #[arg(long)]
        step: String,
    },
    /// Report assembly and accession step statuses for many druids
    WorkflowStatus {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long, value_enum, value_delimiter = ',', default_value = "assembly")]
        workflows: Vec<ReportWorkflow>,
        /// Also write the report as CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Mark an assemblyWF step as errored for druids
    SetError {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long)]
        step: String,
    },
    /// Error out every assemblyWF step and delete the objects
    Unregister {
        #[command(flatten)]
        druids: DruidSource,
    },
    /// Delete objects from the repository
    Delete {
        #[command(flatten)]
        druids: DruidSource,
    },
    /// Error out objects left waiting in assemblyWF
    ClearStrayWorkflows,
    /// Reset workflow steps to waiting
    ResetWorkflows {
        #[command(flatten)]
        druids: DruidSource,
        /// Steps as workflow:step, e.g. assemblyWF:jp2-create
        #[arg(long = "step", required = true, value_delimiter = ',')]
        steps: Vec<String>,
    },
    /// Delete objects and everything staged for them (NOT REVERSIBLE)
    Cleanup {
        #[command(flatten)]
        druids: DruidSource,
        /// Steps to run: dor, workflows, index, symlinks, stage, stacks
        #[arg(long = "steps", required = true, value_delimiter = ',')]
        steps: Vec<String>,
        /// Print what would be done without doing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Replace the whole content of a datastream
    ReplaceDatastream {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long)]
        datastream: String,
        /// File holding the new content
        #[arg(long)]
        content_file: PathBuf,
    },
    /// Find and replace text within a datastream
    UpdateDatastream {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long)]
        datastream: String,
        #[arg(long)]
        find: String,
        #[arg(long)]
        replace: String,
    },
    /// Copy an APO's default object rights into rightsMetadata
    UpdateRights {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long)]
        apo: String,
    },
    /// List completed or failed druids from a pre-assembly progress log
    ProgressLog {
        path: PathBuf,
        #[arg(long)]
        failed: bool,
    },
    /// Print a YAML project configuration
    ReadConfig {
        path: PathBuf,
        /// Print only this top-level key
        #[arg(long)]
        key: Option<String>,
    },
    /// Report accessioning completion for objects matching a search query
    CompletionReport {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10000)]
        rows: usize,
        /// Ask the workflow service instead of trusting the index
        #[arg(long)]
        check_status_in_dor: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export objects as FOXML files
    Export {
        #[command(flatten)]
        druids: DruidSource,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Ingest exported FOXML files
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Re-publish derived public metadata
    Republish {
        #[command(flatten)]
        druids: DruidSource,
    },
    /// Robot status and start commands for this host
    Robots {
        #[command(subcommand)]
        action: RobotsAction,
    },
    /// Write the effective configuration to a file
    InitConfig {
        #[arg(long, default_value = "dor-admin.toml")]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsAction {
    /// Show whether robots are running
    Status,
    /// Print the commands that start the robots
    Start,
}

/// Where a batch command takes its druids from
#[derive(Args, Debug, Clone, Default)]
pub struct DruidSource {
    /// Druids, comma separated or repeated
    #[arg(long, value_delimiter = ',')]
    pub druids: Vec<String>,
    /// File with one druid per line
    #[arg(long)]
    pub druid_file: Option<PathBuf>,
    /// Pre-assembly progress log to take druids from
    #[arg(long)]
    pub from_log: Option<PathBuf>,
    /// With --from-log, take the druids that did not finish
    #[arg(long, requires = "from_log")]
    pub failed: bool,
}

pub async fn dispatch(command: Commands, config: DorConfig) -> Result<()> {
    match command {
        Commands::StagingPath { druid, base } => {
            StagingPathCommand::new(druid).with_base(base).execute()
        }
        Commands::Lookup { source_ids } => LookupCommand::new(source_ids).execute(&config).await,
        Commands::StepStatus { druid, workflow, step } => {
            StepStatusCommand::new(druid, workflow, step).execute(&config).await
        }
        Commands::WorkflowStatus {
            druids,
            workflows,
            output,
        } => {
            WorkflowStatusCommand::new(druids, workflows)
                .with_output(output)
                .execute(&config)
                .await
        }
        Commands::SetError { druids, step } => SetErrorCommand::new(druids, step).execute(&config).await,
        Commands::Unregister { druids } => UnregisterCommand::new(druids).execute(&config).await,
        Commands::Delete { druids } => DeleteCommand::new(druids).execute(&config).await,
        Commands::ClearStrayWorkflows => ClearStrayWorkflowsCommand::new().execute(&config).await,
        Commands::ResetWorkflows { druids, steps } => {
            ResetWorkflowsCommand::new(druids, steps).execute(&config).await
        }
        Commands::Cleanup {
            druids,
            steps,
            dry_run,
        } => {
            CleanupCommand::new(druids, steps)
                .with_dry_run(dry_run)
                .execute(&config)
                .await
        }
        Commands::ReplaceDatastream {
            druids,
            datastream,
            content_file,
        } => {
            ReplaceDatastreamCommand::new(druids, datastream, content_file)
                .execute(&config)
                .await
        }
        Commands::UpdateDatastream {
            druids,
            datastream,
            find,
            replace,
        } => {
            UpdateDatastreamCommand::new(druids, datastream, find, replace)
                .execute(&config)
                .await
        }
        Commands::UpdateRights { druids, apo } => UpdateRightsCommand::new(druids, apo).execute(&config).await,
        Commands::ProgressLog { path, failed } => ProgressLogCommand::new(path).with_failed(failed).execute(),
        Commands::ReadConfig { path, key } => ReadConfigCommand::new(path).with_key(key).execute(),
        Commands::CompletionReport {
            query,
            rows,
            check_status_in_dor,
            output,
        } => {
            CompletionReportCommand::new(query)
                .with_rows(rows)
                .with_check_status_in_dor(check_status_in_dor)
                .with_output(output)
                .execute(&config)
                .await
        }
        Commands::Export { druids, dir } => ExportCommand::new(druids, dir).execute(&config).await,
        Commands::Import { files } => ImportCommand::new(files).execute(&config).await,
        Commands::Republish { druids } => RepublishCommand::new(druids).execute(&config).await,
        Commands::Robots { action } => RobotsCommand::new(action).execute(&config).await,
        Commands::InitConfig { path, force } => InitConfigCommand::new(path).with_force(force).execute(&config).await,
    }
}
