//! Workflow step lists and the bulk operations driven by them.
//!
//! Assembly steps are walked in their fixed order for status reports,
//! error-marking and resets. Every per-object failure lands in a
//! [`BatchReport`] instead of stopping the run.

use crate::batch::BatchReport;
use crate::druid::Druid;
use crate::services::{ServiceError, Services};
use anyhow::{bail, Result};
use tracing::{debug, info};

pub const ASSEMBLY_WF: &str = "assemblyWF";
pub const ACCESSION_WF: &str = "accessionWF";

/// Assembly steps with the status each one starts in
pub const ASSEMBLY_WF_STEPS: [(&str, &str); 5] = [
    ("start-assembly", "completed"),
    ("jp2-create", "waiting"),
    ("checksum-compute", "waiting"),
    ("exif-collect", "waiting"),
    ("accessioning-initiate", "waiting"),
];

/// Accession steps shown in status reports
pub const ACCESSION_REPORT_STEPS: [&str; 5] = [
    "content-metadata",
    "descriptive-metadata",
    "rights-metadata",
    "shelve",
    "publish",
];

pub const NOT_FOUND: &str = "NOT FOUND";
pub const ERROR_MESSAGE: &str = "Integration testing";
pub const WAITING: &str = "waiting";

pub fn assembly_step_names() -> impl Iterator<Item = &'static str> {
    ASSEMBLY_WF_STEPS.iter().map(|(step, _)| *step)
}

/// Ordered workflow -> steps selection, e.g. from `assemblyWF:jp2-create`
pub type StepSelection = Vec<(String, Vec<String>)>;

/// Group `workflow:step` specs by workflow, keeping first-seen order
pub fn parse_step_selection<S: AsRef<str>>(specs: &[S]) -> Result<StepSelection> {
    let mut selection: StepSelection = Vec::new();
    for spec in specs {
        let spec = spec.as_ref().trim();
        let Some((workflow, step)) = spec.split_once(':') else {
            bail!("invalid step {spec:?}, expected workflow:step");
        };
        if workflow.is_empty() || step.is_empty() {
            bail!("invalid step {spec:?}, expected workflow:step");
        }
        match selection.iter_mut().find(|(name, _)| name == workflow) {
            Some((_, steps)) => steps.push(step.to_string()),
            None => selection.push((workflow.to_string(), vec![step.to_string()])),
        }
    }
    Ok(selection)
}

/// Current status of a step, or `NOT FOUND` when it cannot be determined
pub async fn get_workflow_status(services: &Services, druid: &Druid, workflow: &str, step: &str) -> String {
    match services
        .workflow
        .workflow_status(&services.repo, &druid.qualified(), workflow, step)
        .await
    {
        Ok(status) => status,
        Err(err) => {
            debug!(druid = %druid, workflow, step, error = %err, "workflow status unavailable");
            NOT_FOUND.to_string()
        }
    }
}

/// Mark one assembly step as errored
pub async fn set_workflow_step_to_error(services: &Services, druid: &Druid, step: &str) -> Result<(), ServiceError> {
    services
        .workflow
        .update_workflow_error_status(&services.repo, &druid.qualified(), ASSEMBLY_WF, step, ERROR_MESSAGE)
        .await
}

pub async fn delete_from_dor(services: &Services, druid: &Druid) -> Result<(), ServiceError> {
    services.repository.delete_object(&druid.qualified()).await
}

/// Error out every assembly step, then delete the object
pub async fn unregister(services: &Services, druid: &Druid) -> Result<(), ServiceError> {
    for step in assembly_step_names() {
        set_workflow_step_to_error(services, druid, step).await?;
    }
    delete_from_dor(services, druid).await
}

/// Remove the assembly and accession workflow records of an object.
///
/// A workflow that is already gone counts as removed.
pub async fn delete_workflows(services: &Services, druid: &Druid) -> Result<(), ServiceError> {
    for workflow in [ASSEMBLY_WF, ACCESSION_WF] {
        match services
            .workflow
            .delete_workflow(&services.repo, &druid.qualified(), workflow)
            .await
        {
            Ok(()) => {}
            Err(err) if err.is_not_found() => debug!(druid = %druid, workflow, "no workflow to delete"),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Error out objects that started assembly but are stuck waiting at a step
pub async fn clear_stray_workflows(services: &Services) -> BatchReport {
    let mut report = BatchReport::new("clear-stray-workflows");
    let completed = ASSEMBLY_WF_STEPS[0].0;

    for waiting in assembly_step_names() {
        let druids = match services
            .workflow
            .objects_for_workstep(completed, waiting, &services.repo, ASSEMBLY_WF)
            .await
        {
            Ok(druids) => druids,
            Err(err) => {
                report.failed(format!("{ASSEMBLY_WF}:{waiting}"), err);
                continue;
            }
        };

        for druid in druids {
            match services
                .workflow
                .update_workflow_error_status(&services.repo, &druid, ASSEMBLY_WF, waiting, ERROR_MESSAGE)
                .await
            {
                Ok(()) => report.succeeded(druid, format!("{ASSEMBLY_WF}:{waiting} set to error")),
                Err(err) => report.failed(druid, err),
            }
        }
    }

    report.finish()
}

/// Reset every selected step to `waiting` for each druid.
///
/// The first failing step ends that druid's resets; the batch moves on.
pub async fn reset_workflow_states(services: &Services, druids: &[Druid], steps: &StepSelection) -> BatchReport {
    let mut report = BatchReport::new("reset-workflows");

    for druid in druids {
        info!(druid = %druid, "resetting workflow steps");
        let mut reset = Vec::new();
        let mut failure = None;

        'steps: for (workflow, states) in steps {
            for state in states {
                println!("Updating {workflow}:{state} to {WAITING}");
                if let Err(err) = services
                    .workflow
                    .update_workflow_status(&services.repo, &druid.qualified(), workflow, state, WAITING)
                    .await
                {
                    failure = Some(err);
                    break 'steps;
                }
                reset.push(format!("{workflow}:{state}"));
            }
        }

        match failure {
            Some(err) => report.failed(druid.qualified(), err),
            None => report.succeeded(druid.qualified(), format!("reset {}", reset.join(", "))),
        }
    }

    report.finish()
}
