//! Druid identifiers and the sharded directory trees derived from them.
//!
//! A druid such as `druid:aa000aa0001` shards into the tree
//! `aa/000/aa/0001/aa000aa0001`. Staging areas keep an object's files in the
//! directory holding that leaf, i.e. `aa/000/aa/0001`.

use crate::batch::ItemFailure;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

const PREFIX: &str = "druid:";

static DRUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:druid:)?([a-z]{2})([0-9]{3})([a-z]{2})([0-9]{4})$")
        .expect("druid pattern is valid")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DruidError {
    #[error("invalid druid: {input:?}")]
    Invalid { input: String },
}

/// A parsed repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Druid {
    id: String,
}

impl Druid {
    pub fn parse(input: &str) -> Result<Self, DruidError> {
        let trimmed = input.trim();
        if !DRUID_PATTERN.is_match(trimmed) {
            return Err(DruidError::Invalid {
                input: input.to_string(),
            });
        }
        let id = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);
        Ok(Self { id: id.to_string() })
    }

    /// The bare identifier without the `druid:` namespace.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The namespaced form used by the remote services.
    pub fn qualified(&self) -> String {
        format!("{PREFIX}{}", self.id)
    }

    /// Underscore form used for file names (`druid_aa000aa0001`).
    pub fn file_stem(&self) -> String {
        format!("druid_{}", self.id)
    }

    /// The four shard segments: two letters, three digits, two letters, four digits.
    pub fn segments(&self) -> [&str; 4] {
        let id = self.id.as_str();
        [&id[0..2], &id[2..5], &id[5..7], &id[7..11]]
    }

    /// Shard segments followed by the bare id.
    pub fn tree(&self) -> PathBuf {
        let mut tree: PathBuf = self.segments().iter().collect();
        tree.push(&self.id);
        tree
    }

    /// Full tree path below `base`.
    pub fn path(&self, base: &Path) -> PathBuf {
        base.join(self.tree())
    }
}

impl fmt::Display for Druid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.id)
    }
}

impl FromStr for Druid {
    type Err = DruidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse a batch of ids, keeping each unparseable one as a failure of its own
pub fn parse_all<S: AsRef<str>>(ids: &[S]) -> (Vec<Druid>, Vec<ItemFailure>) {
    let mut druids = Vec::new();
    let mut invalid = Vec::new();
    for id in ids {
        match Druid::parse(id.as_ref()) {
            Ok(druid) => druids.push(druid),
            Err(err) => invalid.push(ItemFailure {
                id: id.as_ref().to_string(),
                cause: err.to_string(),
            }),
        }
    }
    (druids, invalid)
}

/// Directory holding an object's staged material, optionally under `base`.
///
/// Without a base the result is relative and never starts with a separator.
pub fn staging_path(druid: &Druid, base: Option<&Path>) -> PathBuf {
    let shards: PathBuf = druid.segments().iter().collect();
    match base {
        Some(base) if !base.as_os_str().is_empty() => base.join(shards),
        _ => shards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_staging_path_without_base() {
        let druid = Druid::parse("aa000aa0001").unwrap();
        assert_eq!(staging_path(&druid, None), PathBuf::from("aa/000/aa/0001"));
    }

    #[test]
    fn test_staging_path_with_base() {
        let druid = Druid::parse("aa000aa0001").unwrap();
        assert_eq!(
            staging_path(&druid, Some(Path::new("/tmp"))),
            PathBuf::from("/tmp/aa/000/aa/0001")
        );
    }

    #[test]
    fn test_empty_base_is_relative() {
        let druid = Druid::parse("druid:aa000aa0001").unwrap();
        let path = staging_path(&druid, Some(Path::new("")));
        assert_eq!(path, PathBuf::from("aa/000/aa/0001"));
    }

    #[test]
    fn test_namespace_is_optional() {
        let bare = Druid::parse("bc006dj2846").unwrap();
        let qualified = Druid::parse("druid:bc006dj2846").unwrap();
        assert_eq!(bare, qualified);
        assert_eq!(bare.qualified(), "druid:bc006dj2846");
        assert_eq!(bare.to_string(), "druid:bc006dj2846");
        assert_eq!(bare.file_stem(), "druid_bc006dj2846");
    }

    #[test]
    fn test_tree_ends_with_id() {
        let druid = Druid::parse("druid:bc006dj2846").unwrap();
        assert_eq!(druid.tree(), PathBuf::from("bc/006/dj/2846/bc006dj2846"));
        assert_eq!(
            druid.path(Path::new("/dor/workspace")),
            PathBuf::from("/dor/workspace/bc/006/dj/2846/bc006dj2846")
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Druid::parse("druid:abc").is_err());
        assert!(Druid::parse("").is_err());
        assert!(Druid::parse("aa000aa00011").is_err());
        assert!(Druid::parse("AA000AA0001").is_err());
    }

    #[test]
    fn test_parse_all_keeps_bad_ids_as_failures() {
        let (druids, invalid) = parse_all(&["aa000aa0001", "bad-id", "druid:cc222cc2222"]);
        let ids: Vec<String> = druids.iter().map(Druid::qualified).collect();
        assert_eq!(ids, vec!["druid:aa000aa0001", "druid:cc222cc2222"]);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].id, "bad-id");
        assert!(invalid[0].cause.contains("invalid druid"));
    }

    proptest! {
        #[test]
        fn prop_relative_staging_path_never_starts_with_separator(
            id in "[a-z]{2}[0-9]{3}[a-z]{2}[0-9]{4}"
        ) {
            let druid = Druid::parse(&id).unwrap();
            let path = staging_path(&druid, None);
            prop_assert!(!path.to_string_lossy().starts_with('/'));
            prop_assert_eq!(path.to_string_lossy().replace('/', ""), id);
        }
    }
}
