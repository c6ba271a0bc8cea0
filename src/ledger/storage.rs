use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

/// Durable key-value storage handed to the score ledger.
pub trait Storage {
    /// Returns `Ok(None)` when nothing has been stored under `key`.
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(key: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let mut storage = Self::new();
        storage.records.insert(key.to_string(), bytes.into());
        storage
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.records.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes land in a temporary sibling first and are renamed over the target,
/// so a reader sees either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &target)?;
        debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("minesweeper-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("scores").unwrap(), None);

        storage.write("scores", b"[]").unwrap();
        assert_eq!(storage.read("scores").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn file_storage_missing_record_is_none() {
        let storage = FileStorage::new(temp_dir());
        assert_eq!(storage.read("scores").unwrap(), None);
    }

    #[test]
    fn file_storage_overwrites_atomically() {
        let dir = temp_dir();
        let mut storage = FileStorage::new(&dir);

        storage.write("scores", b"first").unwrap();
        storage.write("scores", b"second").unwrap();

        assert_eq!(storage.read("scores").unwrap(), Some(b"second".to_vec()));
        assert!(!dir.join(".scores.json.tmp").exists());

        fs::remove_dir_all(dir).unwrap();
    }
}
