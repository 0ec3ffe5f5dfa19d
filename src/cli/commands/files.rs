use crate::progress;
use anyhow::{bail, Result};
use serde_yml::Value;
use std::path::PathBuf;

pub struct ProgressLogCommand {
    pub path: PathBuf,
    pub failed: bool,
}

impl ProgressLogCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path, failed: false }
    }

    pub fn with_failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }

    pub fn execute(&self) -> Result<()> {
        for druid in progress::druids_from_log(&self.path, !self.failed)? {
            println!("{druid}");
        }
        Ok(())
    }
}

pub struct ReadConfigCommand {
    pub path: PathBuf,
    pub key: Option<String>,
}

impl ReadConfigCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path, key: None }
    }

    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }

    pub fn execute(&self) -> Result<()> {
        let config = progress::load_config(&self.path)?;
        let value = match &self.key {
            Some(key) => match config.get(key.as_str()) {
                Some(value) => value.clone(),
                None => bail!("{key} not found in {}", self.path.display()),
            },
            None => config,
        };

        match value {
            Value::String(text) => println!("{text}"),
            other => print!("{}", serde_yml::to_string(&other)?),
        }
        Ok(())
    }
}
