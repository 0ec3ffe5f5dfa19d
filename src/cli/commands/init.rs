//! `init-config`: write the effective configuration as a starting file.
//!
//! An existing file is never overwritten without `--force`.

use crate::config::DorConfig;
use crate::fs::{FileSystemOperations, StandardFileSystem};
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub struct InitConfigCommand {
    pub path: PathBuf,
    pub force: bool,
    fs_ops: Arc<dyn FileSystemOperations>,
}

impl InitConfigCommand {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            force: false,
            fs_ops: Arc::new(StandardFileSystem),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOperations>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    pub async fn write(&self, config: &DorConfig) -> Result<()> {
        if self.fs_ops.exists(&self.path) && !self.force {
            return Err(anyhow!(
                "{} already exists. Use --force to overwrite",
                self.path.display()
            ));
        }

        let contents = toml::to_string_pretty(config)?;
        self.fs_ops.write(&self.path, contents.as_bytes()).await?;
        Ok(())
    }

    pub async fn execute(&self, config: &DorConfig) -> Result<()> {
        println!("⚙️  Writing {} configuration to {}", config.environment, self.path.display());
        self.write(config).await?;
        println!("✅ Configuration written");
        Ok(())
    }
}
