use crate::cli::commands::connect_services;
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::reports::{self, ReportWorkflow};
use anyhow::Result;
use std::path::PathBuf;

pub struct WorkflowStatusCommand {
    pub druids: DruidSource,
    pub workflows: Vec<ReportWorkflow>,
    pub output: Option<PathBuf>,
}

impl WorkflowStatusCommand {
    pub fn new(druids: DruidSource, workflows: Vec<ReportWorkflow>) -> Self {
        Self {
            druids,
            workflows,
            output: None,
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, _invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;
        reports::workflow_status_report(&services, &druids, &self.workflows, self.output.as_deref()).await?;
        Ok(())
    }
}

pub struct CompletionReportCommand {
    pub query: String,
    pub rows: usize,
    pub check_status_in_dor: bool,
    pub output: Option<PathBuf>,
}

impl CompletionReportCommand {
    pub fn new(query: String) -> Self {
        Self {
            query,
            rows: 10000,
            check_status_in_dor: false,
            output: None,
        }
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_check_status_in_dor(mut self, check: bool) -> Self {
        self.check_status_in_dor = check;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let services = connect_services(config)?;
        let rows = reports::completion_report(
            &services,
            config,
            &self.query,
            self.rows,
            self.check_status_in_dor,
            self.output.as_deref(),
        )
        .await?;
        println!("📊 {} objects reported", rows.len());
        Ok(())
    }
}
