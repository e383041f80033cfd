//! Persistence of the "tutorial completed" flag
//!
//! The engine reads the flag once at construction and writes it once when the
//! tutorial finishes. Storage problems never stop the game: unreadable data
//! reads as "not completed" and failed writes are logged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Collaborator that remembers whether the player has seen the tutorial
pub trait TutorialStore {
    fn tutorial_completed(&self) -> bool;
    fn mark_tutorial_completed(&mut self);
}

/// In-process store (the default when no collaborator is supplied)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    completed: bool,
}

impl MemoryStore {
    pub fn new(completed: bool) -> Self {
        Self { completed }
    }
}

impl TutorialStore for MemoryStore {
    fn tutorial_completed(&self) -> bool {
        self.completed
    }

    fn mark_tutorial_completed(&mut self) {
        self.completed = true;
    }
}

/// On-disk layout of [`JsonFileStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredFlags {
    #[serde(default)]
    tutorial_completed: bool,
}

/// Store backed by a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    flags: StoredFlags,
}

impl JsonFileStore {
    /// Open the store at `path`, reading the current flag if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let flags = match Self::read(&path) {
            Ok(flags) => flags,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                StoredFlags::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable store {}: {}", path.display(), e);
                StoredFlags::default()
            }
        };
        Self { path, flags }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<StoredFlags, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the current flags to disk
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.flags)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl TutorialStore for JsonFileStore {
    fn tutorial_completed(&self) -> bool {
        self.flags.tutorial_completed
    }

    fn mark_tutorial_completed(&mut self) {
        self.flags.tutorial_completed = true;
        match self.save() {
            Ok(()) => log::info!("Tutorial flag saved to {}", self.path.display()),
            Err(e) => log::warn!("Failed to save tutorial flag: {}", e),
        }
    }
}
