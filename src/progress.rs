//! Read-only inputs on local disk: plain files, YAML project configs and the
//! multi-document progress logs written by pre-assembly runs.

use crate::keys::{self, symbolize_keys};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yml::Value;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

const PID_KEY: &str = "pid";
const FINISHED_KEY: &str = "pre_assem_finished";

/// Exact file contents, or nothing when the file is missing or unreadable
pub fn read_file(path: impl AsRef<Path>) -> Vec<u8> {
    let path = path.as_ref();
    std::fs::read(path).unwrap_or_else(|err| {
        if err.kind() == ErrorKind::NotFound {
            debug!(path = %path.display(), "file not found");
        } else {
            warn!(path = %path.display(), error = %err, "file not readable");
        }
        Vec::new()
    })
}

/// File contents as text; bytes that are not UTF-8 are replaced, never dropped
pub fn read_text(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    let bytes = read_file(path);
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!(
                path = %path.display(),
                valid_up_to = err.utf8_error().valid_up_to(),
                "file is not valid UTF-8, replacing invalid bytes"
            );
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

/// Parse a YAML file into a generic value; a missing file yields `Null`
pub fn load_config(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = read_text(path);
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yml::from_str(&text).with_context(|| format!("Failed to parse YAML in {}", path.display()))
}

/// One record of a progress log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub pid: String,
    pub finished: bool,
}

/// Every record of a progress log, in file order.
///
/// Keys may be written as symbols (`:pid`) or plain strings. A record
/// without a finished flag counts as not finished; documents without a pid
/// are skipped.
pub fn progress_records(text: &str) -> Result<Vec<ProgressRecord>> {
    let mut records = Vec::new();
    if text.trim().is_empty() {
        return Ok(records);
    }
    for (index, document) in serde_yml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document)
            .with_context(|| format!("Failed to parse progress log document {}", index + 1))?;
        let Value::Mapping(mapping) = symbolize_keys(&value) else {
            continue;
        };
        let Some(pid) = keys::get(&mapping, PID_KEY).and_then(Value::as_str) else {
            continue;
        };
        let finished = keys::get(&mapping, FINISHED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        records.push(ProgressRecord {
            pid: pid.to_string(),
            finished,
        });
    }
    Ok(records)
}

/// Druids from a progress log that finished (`completed`) or did not
pub fn druids_from_log(path: impl AsRef<Path>, completed: bool) -> Result<Vec<String>> {
    let records = progress_records(&read_text(path))?;
    Ok(records
        .into_iter()
        .filter(|record| record.finished == completed)
        .map(|record| record.pid)
        .collect())
}
