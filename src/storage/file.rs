//! File-based storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelseekError, Result};
use crate::storage::{Storage, StorageInput, StorageOutput};

/// Configuration for [`FileStorage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStorageConfig {
    /// Root directory.
    pub path: PathBuf,
    /// I/O buffer size in bytes.
    pub buffer_size: usize,
    /// fsync every output on close.
    pub sync_writes: bool,
}

impl FileStorageConfig {
    /// Default configuration rooted at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            buffer_size: 64 * 1024,
            sync_writes: true,
        }
    }
}

/// A file-based storage implementation rooted at one directory.
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    config: FileStorageConfig,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn new(config: FileStorageConfig) -> Result<Self> {
        let directory = config.path.clone();

        if !directory.exists() {
            std::fs::create_dir_all(&directory).map_err(|e| {
                ModelseekError::storage(format!(
                    "Failed to create directory '{}': {e}",
                    directory.display()
                ))
            })?;
        }

        if !directory.is_dir() {
            return Err(ModelseekError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage { directory, config })
    }

    /// Open a storage directory with default settings.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(FileStorageConfig::new(path.as_ref()))
    }

    /// Root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn io_error(name: &str, e: std::io::Error) -> ModelseekError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ModelseekError::storage(format!("File not found: {name}"))
        } else {
            ModelseekError::storage(format!("I/O error on '{name}': {e}"))
        }
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let file = File::open(self.file_path(name)).map_err(|e| Self::io_error(name, e))?;
        Ok(Box::new(FileInput::new(file, self.config.buffer_size)?))
    }

    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)> {
        let temp_name = format!("{prefix}.{}.tmp", uuid::Uuid::new_v4().simple());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.file_path(&temp_name))
            .map_err(|e| Self::io_error(&temp_name, e))?;

        let output = FileOutput::new(file, self.config.buffer_size, self.config.sync_writes);
        Ok((temp_name, Box::new(output)))
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        std::fs::rename(self.file_path(old_name), self.file_path(new_name))
            .map_err(|e| Self::io_error(old_name, e))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| Self::io_error(name, e))?;
        }
        Ok(())
    }
}

/// A file input implementation.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Result<Self> {
        let size = file
            .metadata()
            .map_err(|e| ModelseekError::storage(format!("Failed to get file metadata: {e}")))?
            .len();
        Ok(FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A file output implementation.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    sync_writes: bool,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize, sync_writes: bool) -> Self {
        FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            sync_writes,
        }
    }

    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ModelseekError::storage(format!("Failed to flush: {e}")))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| ModelseekError::storage(format!("Failed to sync: {e}")))
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn close(&mut self) -> Result<()> {
        if self.sync_writes {
            self.flush_and_sync()
        } else {
            self.writer
                .flush()
                .map_err(|e| ModelseekError::storage(format!("Failed to flush: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, FileStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::open(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let storage = FileStorage::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.directory(), nested.as_path());
    }

    #[test]
    fn test_write_and_read_file() {
        let (_dir, storage) = create_test_storage();

        storage.write_atomic("test.bin", b"Hello, World!").unwrap();

        assert!(storage.file_exists("test.bin"));
        assert_eq!(storage.read_all("test.bin").unwrap(), b"Hello, World!");
        assert_eq!(storage.open_input("test.bin").unwrap().size().unwrap(), 13);
    }

    #[test]
    fn test_write_atomic_replaces() {
        let (dir, storage) = create_test_storage();
        storage.write_atomic("dense.ann", b"first").unwrap();
        storage.write_atomic("dense.ann", b"second").unwrap();

        assert_eq!(storage.read_all("dense.ann").unwrap(), b"second");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["dense.ann"]);
    }

    #[test]
    fn test_delete_and_missing() {
        let (_dir, storage) = create_test_storage();
        storage.write_atomic("x", b"1").unwrap();
        storage.delete_file("x").unwrap();
        assert!(!storage.file_exists("x"));
        assert!(storage.delete_file("x").is_ok());

        let err = storage.open_input("x").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("plain");
        std::fs::write(&file_path, b"x").unwrap();
        assert!(FileStorage::open(&file_path).is_err());
    }
}
