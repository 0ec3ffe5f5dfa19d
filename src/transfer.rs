//! Moving objects between repositories as FOXML files.
//!
//! An export writes `druid_<id>.xml` and, when the object is indexed, the
//! search document beside it as `druid_<id>.json`. An import ingests those
//! files back and restores the index documents.

use crate::batch::BatchReport;
use crate::druid::Druid;
use crate::fs::FileSystemOperations;
use crate::services::Services;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

async fn export_one(
    services: &Services,
    fs: &dyn FileSystemOperations,
    druid: &Druid,
    dir: &Path,
) -> Result<String> {
    let pid = druid.qualified();
    let foxml = services
        .repository
        .export_object(&pid)
        .await
        .with_context(|| format!("Failed to export {pid}"))?;
    let xml_path = dir.join(format!("{}.xml", druid.file_stem()));
    fs.write(&xml_path, foxml.as_bytes()).await?;

    let mut written = vec![xml_path.display().to_string()];
    if let Some(doc) = services.search.find_document(&pid).await? {
        let json_path = index_document_path(&xml_path);
        fs.write(&json_path, serde_json::to_string_pretty(&doc)?.as_bytes())
            .await?;
        written.push(json_path.display().to_string());
    }
    Ok(written.join(", "))
}

/// Export each druid's FOXML (and index document) into `dir`
pub async fn export_objects(
    services: &Services,
    fs: &dyn FileSystemOperations,
    druids: &[Druid],
    dir: &Path,
) -> BatchReport {
    let mut report = BatchReport::new("export");
    for druid in druids {
        match export_one(services, fs, druid, dir).await {
            Ok(written) => {
                println!("exported {druid} to {written}");
                report.succeeded(druid.qualified(), written);
            }
            Err(err) => {
                println!("** export failed for {druid} with {err:#}");
                report.failed(druid.qualified(), format!("{err:#}"));
            }
        }
    }
    report.finish()
}

/// Index document stored next to an exported FOXML file
pub fn index_document_path(foxml: &Path) -> PathBuf {
    foxml.with_extension("json")
}

/// Ingest FOXML files, restoring sibling index documents.
///
/// The index is committed once at the end when any document was restored.
pub async fn import_objects(services: &Services, fs: &dyn FileSystemOperations, files: &[PathBuf]) -> BatchReport {
    let mut report = BatchReport::new("import");
    let mut restored = 0usize;

    for file in files {
        let id = file.display().to_string();
        let result: Result<(String, bool)> = async {
            let foxml = fs.read_to_string(file).await?;
            let pid = services
                .repository
                .ingest_object(&foxml)
                .await
                .with_context(|| format!("Failed to ingest {id}"))?;

            let doc_path = index_document_path(file);
            if !fs.exists(&doc_path) {
                return Ok((pid, false));
            }
            let doc: Value = serde_json::from_str(&fs.read_to_string(&doc_path).await?)
                .with_context(|| format!("Invalid index document {}", doc_path.display()))?;
            services.search.add_document(&doc).await?;
            Ok((pid, true))
        }
        .await;

        match result {
            Ok((pid, indexed)) => {
                if indexed {
                    restored += 1;
                }
                println!("imported {id} as {pid}");
                let detail = if indexed { format!("{pid} (indexed)") } else { pid };
                report.succeeded(id, detail);
            }
            Err(err) => {
                println!("** import failed for {id} with {err:#}");
                report.failed(id, format!("{err:#}"));
            }
        }
    }

    if restored > 0 {
        if let Err(err) = services.search.commit().await {
            warn!(error = %err, "failed to commit restored index documents");
            report.failed("index commit", err);
        }
    }
    report.finish()
}

/// Re-publish derived public metadata for every druid
pub async fn republish(services: &Services, druids: &[Druid]) -> BatchReport {
    let mut report = BatchReport::new("republish");
    for druid in druids {
        match services.repository.publish_metadata(&druid.qualified()).await {
            Ok(()) => {
                info!(druid = %druid, "republished metadata");
                report.succeeded(druid.qualified(), "published");
            }
            Err(err) => report.failed(druid.qualified(), err),
        }
    }
    report.finish()
}
