//! Durable key-value storage for the client, saved as JSON.
//!
//! Plays the part of the browser's local storage: the session lives here as
//! two entries (bearer token and serialized identity) that are always written
//! and cleared together.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, ErrorKind::NotFound},
    path::PathBuf,
    sync::RwLock,
};
use thiserror::Error;

use crate::consts::{TOKEN_KEY, USER_KEY};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    Poisoned,
}

#[derive(Serialize, Deserialize, Default, Clone)]
struct Entries(BTreeMap<String, String>);

/// Key-value store. Without a path it only lives in memory.
#[derive(Default)]
pub struct Storage {
    path: Option<PathBuf>,
    entries: RwLock<Entries>,
}

/// The persisted half of a session, as raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredCredentials {
    pub token: Option<String>,
    pub user: Option<String>,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: PathBuf) -> Result<Self, StorageError> {
        match File::open(&path) {
            Ok(f) => {
                let entries = match serde_json::from_reader(f) {
                    Ok(entries) => entries,
                    // Unreadable content is dropped rather than blocking startup
                    Err(e) => {
                        warn!("Storage file {} unreadable ({e}), starting empty", path.display());
                        Entries::default()
                    }
                };
                Ok(Self {
                    path: Some(path),
                    entries: RwLock::new(entries),
                })
            }

            Err(not_found) if not_found.kind() == NotFound => {
                info!("Storage file not found, creating {}", path.display());
                let storage = Self {
                    path: Some(path),
                    entries: RwLock::default(),
                };
                storage.save()?;
                Ok(storage)
            }

            Err(other) => Err(other.into()),
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        self.write_file(&entries)
    }

    fn write_file(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(path) = &self.path {
            let file = File::create(path)?;
            serde_json::to_writer_pretty(file, entries)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.0.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    pub fn credentials(&self) -> StoredCredentials {
        StoredCredentials {
            token: self.get(TOKEN_KEY),
            user: self.get(USER_KEY),
        }
    }

    /// Writes token and identity in a single persisted update.
    pub fn store_credentials(&self, token: &str, user: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(TOKEN_KEY.to_string(), token.to_string());
            entries.insert(USER_KEY.to_string(), user.to_string());
        })
    }

    pub fn clear_credentials(&self) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(TOKEN_KEY);
            entries.remove(USER_KEY);
        })
    }

    /// Applies `apply` to a copy of the entries. Memory only sees the change
    /// once the file holds it.
    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        let mut next = entries.clone();
        apply(&mut next.0);
        self.write_file(&next)?;
        *entries = next;
        Ok(())
    }
}
