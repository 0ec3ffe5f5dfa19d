//! Bulk edits of one named datastream across many objects.

use crate::batch::BatchReport;
use crate::druid::Druid;
use crate::services::{ServiceError, Services};
use tracing::info;

pub const RIGHTS_METADATA: &str = "rightsMetadata";
pub const DEFAULT_OBJECT_RIGHTS: &str = "defaultObjectRights";

/// Apply `edit` to the current content of a datastream on every druid and
/// save the result. Objects without the datastream are skipped.
async fn edit_datastreams<F>(
    services: &Services,
    operation: &str,
    druids: &[Druid],
    datastream: &str,
    verb: &str,
    edit: F,
) -> BatchReport
where
    F: Fn(&str) -> String,
{
    let mut report = BatchReport::new(operation);

    for druid in druids {
        let pid = druid.qualified();
        let result: Result<Option<()>, ServiceError> = async {
            let Some(current) = services.repository.datastream_content(&pid, datastream).await? else {
                return Ok(None);
            };
            services
                .repository
                .replace_datastream(&pid, datastream, &edit(&current))
                .await?;
            Ok(Some(()))
        }
        .await;

        match result {
            Ok(Some(())) => {
                println!("{verb} {datastream} for {pid}");
                report.succeeded(pid, format!("{verb} {datastream}"));
            }
            Ok(None) => {
                println!("{datastream} does not exist for {pid}");
                report.skipped(pid, format!("{datastream} does not exist"));
            }
            Err(err) => {
                println!("an error occurred trying to update {datastream} for {pid} with message {err}");
                report.failed(pid, err);
            }
        }
    }

    report.finish()
}

/// Replace the whole content of a datastream on every druid
pub async fn replace_datastreams(services: &Services, druids: &[Druid], datastream: &str, content: &str) -> BatchReport {
    info!(datastream, objects = druids.len(), "replacing datastreams");
    edit_datastreams(services, "replace-datastream", druids, datastream, "replaced", |_| {
        content.to_string()
    })
    .await
}

/// Literal find-all-and-replace within a datastream on every druid
pub async fn update_datastreams(
    services: &Services,
    druids: &[Druid],
    datastream: &str,
    find: &str,
    replace: &str,
) -> BatchReport {
    info!(datastream, objects = druids.len(), "updating datastreams");
    edit_datastreams(services, "update-datastream", druids, datastream, "updated", |current| {
        if find.is_empty() {
            current.to_string()
        } else {
            current.replace(find, replace)
        }
    })
    .await
}

/// Copy the default object rights of an admin policy object into the
/// rights metadata of every druid.
///
/// Fails up front when the policy object has no default rights to copy.
pub async fn update_rights_metadata(services: &Services, druids: &[Druid], apo: &Druid) -> Result<BatchReport, ServiceError> {
    let rights = services
        .repository
        .datastream_content(&apo.qualified(), DEFAULT_OBJECT_RIGHTS)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("{DEFAULT_OBJECT_RIGHTS} of {apo}")))?;

    Ok(replace_datastreams(services, druids, RIGHTS_METADATA, &rights).await)
}
