//! Remote shell sessions on the file-serving hosts.
//!
//! Sessions ride on the system `ssh` binary with connection multiplexing: the
//! master connection is opened once by [`RemoteConnector::connect`], every
//! [`RemoteSession::exec`] reuses it, and [`RemoteSession::close`] tears it down.

use super::command::{CommandError, CommandExecutor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteShellError {
    #[error("Failed to connect to {destination}: {message}")]
    Connect { destination: String, message: String },
    #[error("Remote command failed on {destination} (exit {status_code}): {stderr}")]
    Remote {
        destination: String,
        status_code: i32,
        stderr: String,
    },
    #[error("Command execution error: {source}")]
    Command {
        #[from]
        source: CommandError,
    },
}

/// An open, authenticated shell session on one host
#[async_trait]
pub trait RemoteSession: Send {
    fn destination(&self) -> &str;

    /// Run a shell command remotely and return its stdout
    async fn exec(&mut self, command: &str) -> Result<String, RemoteShellError>;

    async fn close(self: Box<Self>) -> Result<(), RemoteShellError>;
}

/// Opens remote sessions
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self, host: &str, user: &str) -> Result<Box<dyn RemoteSession>, RemoteShellError>;
}

/// Quote a value for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Recursive, forced delete of a remote path
pub fn remove_tree_command(path: &Path) -> String {
    format!("rm -fr {}", shell_quote(&path.to_string_lossy()))
}

/// Control socket used for one host's master connection
pub fn control_path(control_dir: &Path, host: &str) -> PathBuf {
    control_dir.join(format!("dor-admin-{}-{}.sock", std::process::id(), host))
}

pub struct SshConnector {
    executor: Arc<dyn CommandExecutor>,
    control_dir: PathBuf,
}

impl SshConnector {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            control_dir: std::env::temp_dir(),
        }
    }

    pub fn with_control_dir(mut self, control_dir: impl Into<PathBuf>) -> Self {
        self.control_dir = control_dir.into();
        self
    }
}

#[async_trait]
impl RemoteConnector for SshConnector {
    async fn connect(&self, host: &str, user: &str) -> Result<Box<dyn RemoteSession>, RemoteShellError> {
        let destination = format!("{user}@{host}");
        let control_path = control_path(&self.control_dir, host);
        let control_option = format!("ControlPath={}", control_path.display());

        tracing::info!(%destination, "opening ssh session");
        let output = self
            .executor
            .execute(
                "ssh",
                &[
                    "-o",
                    "BatchMode=yes",
                    "-o",
                    "ControlMaster=yes",
                    "-o",
                    &control_option,
                    "-o",
                    "ControlPersist=yes",
                    "-f",
                    "-N",
                    &destination,
                ],
            )
            .await?;

        if !output.success() {
            return Err(RemoteShellError::Connect {
                destination,
                message: output.stderr.trim().to_string(),
            });
        }

        Ok(Box::new(SshSession {
            executor: Arc::clone(&self.executor),
            destination,
            control_option,
        }))
    }
}

pub struct SshSession {
    executor: Arc<dyn CommandExecutor>,
    destination: String,
    control_option: String,
}

#[async_trait]
impl RemoteSession for SshSession {
    fn destination(&self) -> &str {
        &self.destination
    }

    async fn exec(&mut self, command: &str) -> Result<String, RemoteShellError> {
        tracing::debug!(destination = %self.destination, command, "remote exec");
        let output = self
            .executor
            .execute(
                "ssh",
                &["-o", "BatchMode=yes", "-o", &self.control_option, &self.destination, command],
            )
            .await?;

        if !output.success() {
            return Err(RemoteShellError::Remote {
                destination: self.destination.clone(),
                status_code: output.status_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn close(self: Box<Self>) -> Result<(), RemoteShellError> {
        tracing::info!(destination = %self.destination, "closing ssh session");
        let output = self
            .executor
            .execute("ssh", &["-o", &self.control_option, "-O", "exit", &self.destination])
            .await?;

        if !output.success() {
            return Err(RemoteShellError::Remote {
                destination: self.destination.clone(),
                status_code: output.status_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
