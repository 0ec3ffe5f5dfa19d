use crate::cli::commands::{connect_services, finish_batch};
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::datastreams;
use crate::druid::Druid;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct ReplaceDatastreamCommand {
    pub druids: DruidSource,
    pub datastream: String,
    pub content_file: PathBuf,
}

impl ReplaceDatastreamCommand {
    pub fn new(druids: DruidSource, datastream: String, content_file: PathBuf) -> Self {
        Self {
            druids,
            datastream,
            content_file,
        }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let content = std::fs::read_to_string(&self.content_file)
            .with_context(|| format!("Failed to read {}", self.content_file.display()))?;
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = datastreams::replace_datastreams(&services, &druids, &self.datastream, &content).await;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}

pub struct UpdateDatastreamCommand {
    pub druids: DruidSource,
    pub datastream: String,
    pub find: String,
    pub replace: String,
}

impl UpdateDatastreamCommand {
    pub fn new(druids: DruidSource, datastream: String, find: String, replace: String) -> Self {
        Self {
            druids,
            datastream,
            find,
            replace,
        }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report =
            datastreams::update_datastreams(&services, &druids, &self.datastream, &self.find, &self.replace).await;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}

pub struct UpdateRightsCommand {
    pub druids: DruidSource,
    pub apo: String,
}

impl UpdateRightsCommand {
    pub fn new(druids: DruidSource, apo: String) -> Self {
        Self { druids, apo }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let apo = Druid::parse(&self.apo)?;
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = datastreams::update_rights_metadata(&services, &druids, &apo)
            .await
            .with_context(|| format!("Failed to read default rights from {apo}"))?;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}
