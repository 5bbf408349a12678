//! Path validation for image manifest entries.
//!
//! Manifest paths are resolved against the document's directory, so they
//! must never be able to climb out of it.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a manifest path, returning it normalized.
///
/// Rejects anything that escapes the root (leading `..`, absolute prefixes on
/// Windows), null bytes, and paths that normalize to nothing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use imgrab_document::validate_path;
/// assert!(validate_path("images/hero.png").is_ok());
/// assert!(validate_path("../secrets.png").is_err());
/// assert_eq!(validate_path("./a//b/../c.png").unwrap(), Path::new("a/c.png"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}
