use crate::cli::commands::{connect_services, finish_batch};
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::fs::StandardFileSystem;
use crate::transfer;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub struct ExportCommand {
    pub druids: DruidSource,
    pub dir: PathBuf,
}

impl ExportCommand {
    pub fn new(druids: DruidSource, dir: PathBuf) -> Self {
        Self { druids, dir }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        if !self.dir.is_dir() {
            bail!("export directory {} does not exist", self.dir.display());
        }
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;

        let mut report = transfer::export_objects(&services, &StandardFileSystem, &druids, &self.dir).await;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}

pub struct ImportCommand {
    pub files: Vec<PathBuf>,
}

impl ImportCommand {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let services = connect_services(config)?;
        let report = transfer::import_objects(&services, &StandardFileSystem, &self.files).await;
        finish_batch(&report)
    }
}

pub struct RepublishCommand {
    pub druids: DruidSource,
}

impl RepublishCommand {
    pub fn new(druids: DruidSource) -> Self {
        Self { druids }
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let (druids, invalid) = self.druids.require_druids()?;
        let services = connect_services(config)?;
        let mut report = transfer::republish(&services, &druids).await;
        report.extend_failures(invalid);
        finish_batch(&report)
    }
}
