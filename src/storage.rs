use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub const APPOINTMENTS_FILE: &str = "appointments.csv";
pub const USERS_FILE: &str = "users.json";
const APP_DIR_NAME: &str = "AppointmentDesk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform data directory, or the working directory when none is known.
    pub fn resolve() -> Result<Self, StorageError> {
        let root = match dirs::data_dir() {
            Some(base) => base.join(APP_DIR_NAME),
            None => PathBuf::from("."),
        };
        fs::create_dir_all(root.as_path()).map_err(|source| StorageError::Write {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn appointments(&self) -> PathBuf {
        self.root.join(APPOINTMENTS_FILE)
    }

    pub fn users(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }
}

pub(crate) fn write_text_file(path: &Path, content: &str) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    fs::write(path, content).map_err(write_err)
}

pub(crate) fn read_text_file(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })
}
