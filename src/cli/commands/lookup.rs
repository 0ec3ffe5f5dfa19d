use crate::cli::commands::connect_services;
use crate::config::DorConfig;
use crate::druid::{staging_path, Druid};
use crate::services::druids_by_source_id;
use anyhow::Result;
use std::path::PathBuf;

pub struct StagingPathCommand {
    pub druid: String,
    pub base: Option<PathBuf>,
}

impl StagingPathCommand {
    pub fn new(druid: String) -> Self {
        Self { druid, base: None }
    }

    pub fn with_base(mut self, base: Option<PathBuf>) -> Self {
        self.base = base;
        self
    }

    pub fn execute(&self) -> Result<()> {
        let druid = Druid::parse(&self.druid)?;
        println!("{}", staging_path(&druid, self.base.as_deref()).display());
        Ok(())
    }
}

pub struct LookupCommand {
    pub source_ids: Vec<String>,
}

impl LookupCommand {
    pub fn new(source_ids: Vec<String>) -> Self {
        Self { source_ids }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let services = connect_services(config)?;
        let druids = druids_by_source_id(services.search.as_ref(), &self.source_ids).await?;
        if druids.is_empty() {
            println!("📋 No objects found for {}", self.source_ids.join(", "));
            return Ok(());
        }
        for druid in druids {
            println!("{druid}");
        }
        Ok(())
    }
}
