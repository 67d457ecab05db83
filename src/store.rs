use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::STORE_FILE_VERSION;

/// Key-value persistence the engine saves to and restores from.
pub trait GameStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GameStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u8,
    #[serde(rename = "savedAtIso", default)]
    saved_at_iso: String,
    entries: BTreeMap<String, Value>,
}

/// JSON file on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    file_path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileStore {
    pub fn new(file_path: PathBuf) -> Self {
        let entries = load_entries(&file_path);
        Self { file_path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                eprintln!(
                    "[game-store] failed to create parent dir {}: {error}",
                    parent.display()
                );
                return;
            }
        }

        let payload = StoreFile {
            version: STORE_FILE_VERSION,
            saved_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            entries: self.entries.clone(),
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => {
                if let Err(error) = fs::write(&self.file_path, text) {
                    eprintln!(
                        "[game-store] failed to write {}: {error}",
                        self.file_path.display()
                    );
                }
            }
            Err(error) => {
                eprintln!(
                    "[game-store] failed to serialize payload for {}: {error}",
                    self.file_path.display()
                );
            }
        }
    }
}

impl GameStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
        self.save();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.save();
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, Value> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                eprintln!("[game-store] failed to read {}: {error}", path.display());
            }
            return BTreeMap::new();
        }
    };
    match serde_json::from_str::<StoreFile>(&text) {
        Ok(file) if file.version == STORE_FILE_VERSION => file.entries,
        Ok(file) => {
            eprintln!(
                "[game-store] unsupported version {} at {}",
                file.version,
                path.display()
            );
            BTreeMap::new()
        }
        Err(error) => {
            eprintln!("[game-store] failed to parse {}: {error}", path.display());
            BTreeMap::new()
        }
    }
}
