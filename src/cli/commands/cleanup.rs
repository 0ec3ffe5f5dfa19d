use crate::cleanup::{CleanupRunner, TerminalPrompter};
use crate::cli::commands::{connect_services, finish_batch};
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::external::{ProcessCommandExecutor, SshConnector};
use crate::fs::StandardFileSystem;
use anyhow::Result;
use std::sync::Arc;

pub struct CleanupCommand {
    pub druids: DruidSource,
    pub steps: Vec<String>,
    pub dry_run: bool,
}

impl CleanupCommand {
    pub fn new(druids: DruidSource, steps: Vec<String>) -> Self {
        Self {
            druids,
            steps,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        let ids = self.druids.resolve()?;
        let services = connect_services(config)?;
        let connector = SshConnector::new(Arc::new(ProcessCommandExecutor));
        let runner = CleanupRunner::new(config, &services, Arc::new(StandardFileSystem), Arc::new(connector));

        let report = runner
            .run(&ids, &self.steps, self.dry_run, &mut TerminalPrompter)
            .await?;
        finish_batch(&report)
    }
}
