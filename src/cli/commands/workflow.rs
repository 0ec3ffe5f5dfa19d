use crate::batch::BatchReport;
use crate::cli::commands::{connect_services, finish_batch};
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::druid::Druid;
use crate::services::ServiceError;
use crate::workflows::{self, parse_step_selection};
use anyhow::Result;

pub struct StepStatusCommand {
    pub druid: String,
    pub workflow: String,
    pub step: String,
}

impl StepStatusCommand {
    pub fn new(druid: String, workflow: String, step: String) -> Self {
        Self { druid, workflow, step }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let druid = Druid::parse(&self.druid)?;
        let services = connect_services(config)?;
        let status = workflows::get_workflow_status(&services, &druid, &self.workflow, &self.step).await;
        println!("{status}");
        Ok(())
    }
}

fn record(report: &mut BatchReport, druid: &Druid, result: Result<(), ServiceError>, detail: &str) {
    match result {
        Ok(()) => report.succeeded(druid.qualified(), detail),
        Err(err) => report.failed(druid.qualified(), err),
    }
}

pub struct SetErrorCommand {
    pub druids: DruidSource,
    pub step: String,
}

impl SetErrorCommand {
    pub fn new(druids: DruidSource, step: String) -> Self {
        Self { druids, step }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;
        println!("⚠️  Setting {}:{} to error for {} objects", workflows::ASSEMBLY_WF, self.step, druids.len());

        let mut report = BatchReport::new("set-error");
        report.extend_failures(invalid);
        for druid in &druids {
            let result = workflows::set_workflow_step_to_error(&services, druid, &self.step).await;
            record(&mut report, druid, result, "step set to error");
        }
        finish_batch(&report.finish())
    }
}

pub struct UnregisterCommand {
    pub druids: DruidSource,
}

impl UnregisterCommand {
    pub fn new(druids: DruidSource) -> Self {
        Self { druids }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = BatchReport::new("unregister");
        report.extend_failures(invalid);
        for druid in &druids {
            println!("🗑️  Unregistering {druid}");
            let result = workflows::unregister(&services, druid).await;
            record(&mut report, druid, result, "unregistered");
        }
        finish_batch(&report.finish())
    }
}

pub struct DeleteCommand {
    pub druids: DruidSource,
}

impl DeleteCommand {
    pub fn new(druids: DruidSource) -> Self {
        Self { druids }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = BatchReport::new("delete");
        report.extend_failures(invalid);
        for druid in &druids {
            println!("🗑️  Deleting {druid} from Fedora {}", config.environment);
            let result = workflows::delete_from_dor(&services, druid).await;
            record(&mut report, druid, result, "deleted");
        }
        finish_batch(&report.finish())
    }
}

pub struct ClearStrayWorkflowsCommand;

impl ClearStrayWorkflowsCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let services = connect_services(config)?;
        println!("🧹 Clearing stray {} workflows", workflows::ASSEMBLY_WF);
        let report = workflows::clear_stray_workflows(&services).await;
        finish_batch(&report)
    }
}

impl Default for ClearStrayWorkflowsCommand {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ResetWorkflowsCommand {
    pub druids: DruidSource,
    pub steps: Vec<String>,
}

impl ResetWorkflowsCommand {
    pub fn new(druids: DruidSource, steps: Vec<String>) -> Self {
        Self { druids, steps }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let selection = parse_step_selection(&self.steps)?;
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = workflows::reset_workflow_states(&services, &druids, &selection).await;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}
