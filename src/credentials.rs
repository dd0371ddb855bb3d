use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::StorageError;
use crate::storage::{read_text_file, write_text_file};

// First-run accounts. Shipping fixed passwords is a known weakness.
const SEED_ACCOUNTS: [(&str, &str, &str); 2] = [
    ("admin", "admin123", "Administrator"),
    ("doctor", "doctor123", "Dr. García"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub password_hash: String,
    pub display_name: String,
}

type CredentialMap = BTreeMap<String, CredentialRecord>;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Opens the store at `path`, seeding the default accounts if the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let store = Self::new(path);
        if !store.path.exists() {
            store.seed()?;
        }
        Ok(store)
    }

    /// Store at `path` without seeding.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Returns the display name when `password` matches the stored digest.
    /// Unknown users, wrong passwords and unreadable files all yield `None`.
    pub fn verify(&self, username: &str, password: &str) -> Option<String> {
        let digest = hash_password(password);
        let accounts = match read_credentials(self.path.as_path()) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "credential store unavailable");
                return None;
            }
        };
        let record = accounts.get(username)?;
        if record.password_hash.as_bytes() == digest.as_bytes() {
            Some(record.display_name.clone())
        } else {
            None
        }
    }

    fn seed(&self) -> Result<(), StorageError> {
        let accounts: CredentialMap = SEED_ACCOUNTS
            .iter()
            .map(|(username, password, display_name)| {
                (
                    username.to_string(),
                    CredentialRecord {
                        password_hash: hash_password(password),
                        display_name: display_name.to_string(),
                    },
                )
            })
            .collect();
        let content = serde_json::to_string_pretty(&accounts).map_err(|err| StorageError::Corrupt {
            path: self.path.clone(),
            line: 0,
            reason: err.to_string(),
        })?;
        write_text_file(self.path.as_path(), content.as_str())?;
        info!(path = %self.path.display(), accounts = accounts.len(), "seeded credential store");
        Ok(())
    }
}

/// Lowercase hex SHA-256 of the UTF-8 password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn read_credentials(path: &Path) -> Result<CredentialMap, StorageError> {
    let raw = read_text_file(path)?;
    serde_json::from_str(raw.as_str()).map_err(|err| StorageError::Corrupt {
        path: path.to_path_buf(),
        line: err.line(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn open_store() -> (tempfile::TempDir, CredentialStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(temp.path().join("users.json")).unwrap();
        (temp, store)
    }

    #[test]
    fn seeded_accounts_verify() {
        let (_temp, store) = open_store();
        assert_eq!(store.verify("admin", "admin123").as_deref(), Some("Administrator"));
        assert_eq!(store.verify("doctor", "doctor123").as_deref(), Some("Dr. García"));
    }

    #[test]
    fn failures_are_indistinguishable() {
        let (_temp, store) = open_store();
        let wrong_password = store.verify("admin", "wrong");
        let unknown_user = store.verify("nouser", "anything");
        assert_eq!(wrong_password, None);
        assert_eq!(wrong_password, unknown_user);
    }

    #[test]
    fn stores_digests_not_plaintext() {
        let (_temp, store) = open_store();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("admin123"));
        assert!(raw.contains(hash_password("admin123").as_str()));
        let parsed: CredentialMap = serde_json::from_str(raw.as_str()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("admin123"),
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
    }

    #[test]
    fn existing_store_is_not_reseeded() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("users.json");
        let custom = format!(
            "{{\"nurse\": {{\"password_hash\": \"{}\", \"display_name\": \"Nurse Joy\"}}}}",
            hash_password("pokecenter")
        );
        fs::write(path.as_path(), custom).unwrap();
        let store = CredentialStore::open(path.as_path()).unwrap();
        assert_eq!(store.verify("admin", "admin123"), None);
        assert_eq!(store.verify("nurse", "pokecenter").as_deref(), Some("Nurse Joy"));
    }

    #[test]
    fn corrupt_store_always_fails() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("users.json");
        fs::write(path.as_path(), "{not json").unwrap();
        let store = CredentialStore::open(path.as_path()).unwrap();
        assert_eq!(store.verify("admin", "admin123"), None);
    }

    #[test]
    fn missing_store_after_open_always_fails() {
        let (_temp, store) = open_store();
        fs::remove_file(store.path()).unwrap();
        assert_eq!(store.verify("admin", "admin123"), None);
    }
}
