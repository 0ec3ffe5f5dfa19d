use crate::batch::{BatchReport, ItemFailure, ItemOutcome};
use crate::cli::DruidSource;
use crate::config::DorConfig;
use crate::druid::{self, Druid};
use crate::progress;
use crate::services::Services;
use anyhow::{bail, Context, Result};

pub mod cleanup;
pub mod datastream;
pub mod files;
pub mod init;
pub mod lookup;
pub mod report;
pub mod robots;
pub mod transfer;
pub mod workflow;

impl DruidSource {
    /// Collect ids from every given source, in argument order.
    ///
    /// Blank lines and `#` comments in a druid file are ignored. Ids are not
    /// validated here; a bad one fails only its own item.
    pub fn resolve(&self) -> Result<Vec<String>> {
        let mut raw: Vec<String> = self.druids.iter().map(|id| id.trim().to_string()).collect();

        if let Some(path) = &self.druid_file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read druid file {}", path.display()))?;
            raw.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }

        if let Some(path) = &self.from_log {
            raw.extend(progress::druids_from_log(path, !self.failed)?);
        }

        Ok(raw)
    }

    /// Like [`DruidSource::resolve`], but an empty result is an error
    pub fn require(&self) -> Result<Vec<String>> {
        let ids = self.resolve()?;
        if ids.is_empty() {
            bail!("no druids provided (use --druids, --druid-file or --from-log)");
        }
        Ok(ids)
    }

    /// Parsed druids plus one failure per id that does not parse
    pub fn require_druids(&self) -> Result<(Vec<Druid>, Vec<ItemFailure>)> {
        let (druids, invalid) = druid::parse_all(&self.require()?);
        for failure in &invalid {
            eprintln!("❌ skipping {failure}");
        }
        Ok((druids, invalid))
    }
}

pub fn connect_services(config: &DorConfig) -> Result<Services> {
    Services::from_config(config).context("Failed to set up service clients")
}

/// Print every outcome and the tally; any failed item fails the command
pub fn finish_batch(report: &BatchReport) -> Result<()> {
    println!();
    for outcome in report.outcomes() {
        match outcome {
            ItemOutcome::Failed(_) => eprintln!("{outcome}"),
            _ => println!("{outcome}"),
        }
    }
    println!("📊 {}", report.summary());

    if report.has_failures() {
        bail!(
            "{} of {} items failed",
            report.failures().len(),
            report.outcomes().len()
        );
    }
    Ok(())
}
