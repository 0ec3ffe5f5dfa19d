//! External process abstractions
//!
//! Trait-based wrappers over local processes and remote shells so the cleanup
//! and robot-status code can be exercised without touching real hosts.

pub mod command;
pub mod ssh;

pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use ssh::{RemoteConnector, RemoteSession, RemoteShellError, SshConnector};
