//! Comma separated status reports.
//!
//! Every report row is printed to stdout as it is produced and may also be
//! written to a CSV file.

use crate::config::DorConfig;
use crate::druid::Druid;
use crate::services::Services;
use crate::workflows::{self, ACCESSION_REPORT_STEPS, ACCESSION_WF, ASSEMBLY_WF};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

const COMPLETED: &str = "completed";
const PUBLISH_COMPLETED: &str = "accessionWF:publish:completed";
const SHELVE_COMPLETED: &str = "accessionWF:shelve:completed";

pub const COMPLETION_HEADER: [&str; 9] = [
    "druid",
    "label",
    "title",
    "source_id",
    "accessioned",
    "shelved",
    "purl_link",
    "num_files",
    "file_type_list",
];

/// Workflows that can appear as column groups in a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportWorkflow {
    Assembly,
    Accession,
}

impl ReportWorkflow {
    pub fn workflow(&self) -> &'static str {
        match self {
            ReportWorkflow::Assembly => ASSEMBLY_WF,
            ReportWorkflow::Accession => ACCESSION_WF,
        }
    }

    pub fn steps(&self) -> Vec<&'static str> {
        match self {
            ReportWorkflow::Assembly => workflows::assembly_step_names().collect(),
            ReportWorkflow::Accession => ACCESSION_REPORT_STEPS.to_vec(),
        }
    }
}

/// Assembly columns come before accession columns whatever order was asked for
fn ordered(workflows: &[ReportWorkflow]) -> Vec<ReportWorkflow> {
    [ReportWorkflow::Assembly, ReportWorkflow::Accession]
        .into_iter()
        .filter(|workflow| workflows.contains(workflow))
        .collect()
}

pub fn workflow_status_header(workflows: &[ReportWorkflow]) -> Vec<String> {
    std::iter::once("druid".to_string())
        .chain(
            ordered(workflows)
                .iter()
                .flat_map(|workflow| workflow.steps())
                .map(str::to_string),
        )
        .collect()
}

/// One row per druid: the druid followed by the status of every step
pub async fn workflow_status_rows(
    services: &Services,
    druids: &[Druid],
    workflows: &[ReportWorkflow],
) -> Vec<Vec<String>> {
    let workflows = ordered(workflows);
    let mut rows = Vec::with_capacity(druids.len());
    for druid in druids {
        let mut row = vec![druid.qualified()];
        for workflow in &workflows {
            for step in workflow.steps() {
                row.push(workflows::get_workflow_status(services, druid, workflow.workflow(), step).await);
            }
        }
        println!("{}", row.join(","));
        rows.push(row);
    }
    rows
}

/// Print the workflow status grid and optionally write it as CSV
pub async fn workflow_status_report(
    services: &Services,
    druids: &[Druid],
    workflows: &[ReportWorkflow],
    output: Option<&Path>,
) -> Result<Vec<Vec<String>>> {
    println!("Generating report");
    let header = workflow_status_header(workflows);
    println!("{}", header.join(","));

    let rows = workflow_status_rows(services, druids, workflows).await;

    if let Some(path) = output {
        write_csv(path, &header, &rows)?;
        println!("Report generated in {}", path.display());
    }
    Ok(rows)
}

pub fn write_csv<H: AsRef<str>>(path: &Path, header: &[H], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report {}", path.display()))?;
    writer.write_record(header.iter().map(AsRef::as_ref))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Text of a Solr field: the string itself, or the first entry of a list
fn field_text(doc: &Value, name: &str) -> String {
    match &doc[name] {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.first().map(scalar_text).unwrap_or_default(),
        Value::Null => String::new(),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn field_values(doc: &Value, name: &str) -> Vec<String> {
    match &doc[name] {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        Value::Null => Vec::new(),
        other => vec![scalar_text(other)],
    }
}

/// `.tif=2 | .jp2=1`, counting extensions in first-seen order
pub fn file_type_summary(files: &[String]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for file in files {
        let extension = Path::new(file)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        match counts.iter_mut().find(|(seen, _)| *seen == extension) {
            Some((_, count)) => *count += 1,
            None => counts.push((extension, 1)),
        }
    }
    counts
        .iter()
        .map(|(extension, count)| format!("{extension}={count}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Public page for an object, keyed by the bare id
pub fn purl_link(purl_base_url: &str, druid: &str) -> String {
    let bare = druid.rsplit(':').next().unwrap_or(druid);
    format!("{}/{}", purl_base_url.trim_end_matches('/'), bare)
}

/// Build one completion-report row from a search document.
///
/// Accessioned and shelved come from the indexed workflow facets unless
/// `check_status_in_dor` asks the workflow service directly.
pub async fn completion_row(
    services: &Services,
    config: &DorConfig,
    doc: &Value,
    check_status_in_dor: bool,
) -> Vec<String> {
    let druid = field_text(doc, "id");

    let parsed = if check_status_in_dor {
        match Druid::parse(&druid) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(id = %druid, error = %err, "not asking the workflow service, using indexed workflow facets");
                None
            }
        }
    } else {
        None
    };

    let (accessioned, shelved) = match parsed {
        Some(parsed) => (
            workflows::get_workflow_status(services, &parsed, ACCESSION_WF, "publish").await == COMPLETED,
            workflows::get_workflow_status(services, &parsed, ACCESSION_WF, "shelve").await == COMPLETED,
        ),
        None => {
            let facets = field_values(doc, "wf_wps_facet");
            (
                facets.iter().any(|facet| facet == PUBLISH_COMPLETED),
                facets.iter().any(|facet| facet == SHELVE_COMPLETED),
            )
        }
    };

    let files = field_values(doc, "content_file_t");

    vec![
        druid.clone(),
        field_text(doc, "objectLabel_t"),
        field_text(doc, "public_dc_title_t"),
        field_text(doc, "source_id_t"),
        accessioned.to_string(),
        shelved.to_string(),
        purl_link(&config.purl_base_url, &druid),
        files.len().to_string(),
        file_type_summary(&files),
    ]
}

/// Completion rows for every document matching a search query
pub async fn completion_report(
    services: &Services,
    config: &DorConfig,
    query: &str,
    rows: usize,
    check_status_in_dor: bool,
    output: Option<&Path>,
) -> Result<Vec<Vec<String>>> {
    let docs = services
        .search
        .query(query, rows)
        .await
        .with_context(|| format!("Failed to search for {query:?}"))?;

    println!("{}", COMPLETION_HEADER.join(","));
    let mut report = Vec::with_capacity(docs.len());
    for doc in &docs {
        let row = completion_row(services, config, doc, check_status_in_dor).await;
        println!("{}", row.join(","));
        report.push(row);
    }

    if let Some(path) = output {
        write_csv(path, &COMPLETION_HEADER, &report)?;
        println!("Report generated in {}", path.display());
    }
    Ok(report)
}
