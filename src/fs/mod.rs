//! File system operations abstraction for testing
//!
//! Cleanup deletes workspace symlinks and staged directories through this
//! trait so batch behaviour can be verified without touching `/dor`.
//!
//! # Testing with Mocks
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod tests {
//!     use crate::fs::MockFileSystemOperations;
//!     use mockall::predicate::eq;
//!     use std::path::Path;
//!
//!     #[tokio::test]
//!     async fn test_with_mocked_filesystem() {
//!         let mut mock_fs = MockFileSystemOperations::new();
//!         mock_fs
//!             .expect_exists()
//!             .with(eq(Path::new("/dor/workspace/aa")))
//!             .return_const(true);
//!     }
//! }
//! ```
use anyhow::Result;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// True when the path exists, or is a symlink (even a dangling one)
    fn exists(&self, path: &Path) -> bool;

    /// Remove a single file or symlink
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;

    async fn read_to_string(&self, path: &Path) -> Result<String>;

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// Standard implementation that uses actual file system operations
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists() || path.symlink_metadata().is_ok()
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(Into::into)
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_dir_all(path).await.map_err(Into::into)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }
}
