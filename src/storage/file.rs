// ABOUTME: Durable key/value store keeping one JSON file per key in a directory
// ABOUTME: Writes go to a uniquely named temporary file that is renamed into place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

use super::KeyValueStore;
use dom360_core::errors::StorageError;
use std::fmt::Write as _;
use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-backed store rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`; the directory is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the files
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`; characters outside `[A-Za-z0-9_-]` are hex-escaped
    fn path_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                name.push(char::from(byte));
            } else {
                let _ = write!(name, "%{byte:02X}");
            }
        }
        name.push_str(".json");
        self.root.join(name)
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_owned(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| Self::io_error(key, e))?;

        // Each write stages its own file, so concurrent writers never share one
        let mut staging =
            NamedTempFile::new_in(&self.root).map_err(|e| Self::io_error(key, e))?;
        staging
            .write_all(value.as_bytes())
            .map_err(|e| Self::io_error(key, e))?;
        staging
            .persist(self.path_for(key))
            .map_err(|e| Self::io_error(key, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}
