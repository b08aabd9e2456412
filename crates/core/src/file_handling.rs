//! Persistence of the command collection.
//!
//! The whole collection is stored as one YAML sequence and rewritten in full
//! on every save. There is no locking: when two processes save concurrently
//! the later write wins and the other process's changes are lost.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::path::Path;

use log::{debug, warn};

use crate::command_definitions::CommandDefinition;
use crate::error::{Error, Result};

const FILE_DESCRIPTION: &str = "command store";

/// Durable storage for the full command collection.
pub trait Store {
    /// Loads the collection. Never fails: a missing or unreadable store
    /// degrades to an empty collection.
    fn load(&self) -> Vec<CommandDefinition>;

    /// Overwrites the stored collection with `commands`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be serialized or written.
    fn save(&self, commands: &[CommandDefinition]) -> Result<()>;
}

/// A [`Store`] backed by a single YAML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: String,
}

impl FileStore {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_exists(&self) -> Result<()> {
        let Some(parent) = Path::new(&self.path).parent() else {
            return Ok(());
        };

        if parent.as_os_str().is_empty() || parent.exists() {
            return Ok(());
        }

        fs::create_dir_all(parent).map_err(|e| {
            Error::io_error(
                FILE_DESCRIPTION.to_string(),
                parent.display().to_string(),
                e,
            )
        })
    }

    fn create_empty(&self) -> Result<()> {
        self.ensure_parent_exists()?;
        self.save(&[])
    }
}

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    File::open(path)
        .map_err(|e| Error::io_error(file_description.to_string(), path.to_string(), e))
}

fn read_commands(path: &str) -> Result<Vec<CommandDefinition>> {
    let contents = std::io::read_to_string(get_reader(FILE_DESCRIPTION, path)?)
        .map_err(|e| Error::io_error(FILE_DESCRIPTION.to_string(), path.to_string(), e))?;

    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_yaml::from_str(&contents).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            FILE_DESCRIPTION.to_string(),
            path.to_string(),
            e,
        )
    })
}

impl Store for FileStore {
    fn load(&self) -> Vec<CommandDefinition> {
        if !Path::new(&self.path).exists() {
            debug!("No command store at `{}`, creating an empty one", self.path);
            if let Err(e) = self.create_empty() {
                warn!("Could not create command store: {e}");
            }
            return Vec::new();
        }

        match read_commands(&self.path) {
            Ok(commands) => {
                debug!("Loaded {} commands from `{}`", commands.len(), self.path);
                commands
            }
            Err(e) => {
                warn!("Command store is corrupted, starting fresh: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, commands: &[CommandDefinition]) -> Result<()> {
        self.ensure_parent_exists()?;

        let serialized = serde_yaml::to_string(commands).map_err(|e| {
            Error::yaml_error(
                "writing".to_string(),
                FILE_DESCRIPTION.to_string(),
                self.path.clone(),
                e,
            )
        })?;

        fs::write(&self.path, serialized)
            .map_err(|e| Error::io_error(FILE_DESCRIPTION.to_string(), self.path.clone(), e))
    }
}

/// In-memory [`Store`] that records how often it was saved.
///
/// Useful for testing without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    commands: RefCell<Vec<CommandDefinition>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(commands: Vec<CommandDefinition>) -> Self {
        Self {
            commands: RefCell::new(commands),
            saves: Cell::new(0),
        }
    }

    /// Number of completed saves.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.get()
    }

    /// Snapshot of the last saved collection.
    #[must_use]
    pub fn saved(&self) -> Vec<CommandDefinition> {
        self.commands.borrow().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Vec<CommandDefinition> {
        self.commands.borrow().clone()
    }

    fn save(&self, commands: &[CommandDefinition]) -> Result<()> {
        *self.commands.borrow_mut() = commands.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn create_test_command(id: u32, command: &str) -> CommandDefinition {
        CommandDefinition {
            id,
            command: command.to_string(),
            description: "A test command".to_string(),
            tags: BTreeSet::from(["Docker".to_string(), "ops".to_string()]),
            alias: None,
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_micro_opt(9, 30, 0, 123_456)
                .unwrap(),
            last_used_at: None,
            used_count: 0,
        }
    }

    #[test]
    fn test_load_missing_file_creates_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("commands.yml");
        let store = FileStore::new(path.to_str().unwrap());

        assert!(store.load().is_empty());
        assert!(path.exists());

        // The created file is a valid empty collection
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_returns_empty_and_leaves_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "invalid: yaml: content: [").unwrap();
        let store = FileStore::new(temp_file.path().to_str().unwrap());

        assert!(store.load().is_empty());

        let on_disk = fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(on_disk, "invalid: yaml: content: [");
    }

    #[test]
    fn test_load_empty_file_returns_empty() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = FileStore::new(temp_file.path().to_str().unwrap());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = FileStore::new(temp_file.path().to_str().unwrap());

        let mut used = create_test_command(2, "docker ps -a");
        used.alias = Some("dps".to_string());
        used.used_count = 4;
        used.last_used_at = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(18, 0, 5);

        let commands = vec![create_test_command(1, "ls -lah"), used];
        store.save(&commands).unwrap();

        assert_eq!(store.load(), commands);
    }

    #[test]
    fn test_absent_optional_fields_are_omitted() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = FileStore::new(temp_file.path().to_str().unwrap());
        store.save(&[create_test_command(1, "ls")]).unwrap();

        let on_disk = fs::read_to_string(temp_file.path()).unwrap();
        assert!(!on_disk.contains("alias"));
        assert!(!on_disk.contains("last_used_at"));
    }

    #[test]
    fn test_load_json_array() {
        let json_content = r#"[
  {
    "id": 3,
    "command": "git log --oneline",
    "description": "Short log",
    "tags": ["git"],
    "alias": null,
    "created_at": "2024-01-15T10:20:30.500000",
    "used_count": 2,
    "last_used_at": "2024-01-16T08:00:00"
  }
]"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{json_content}").unwrap();
        let store = FileStore::new(temp_file.path().to_str().unwrap());

        let commands = store.load();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].id, 3);
        assert_eq!(commands[0].command, "git log --oneline");
        assert_eq!(commands[0].alias, None);
        assert_eq!(commands[0].used_count, 2);
        assert!(commands[0].last_used_at.is_some());
    }
}
