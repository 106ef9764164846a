//! Storage abstraction for persisted indexes.
//!
//! Dense indexes are written through a [`Storage`] so the same persistence
//! code runs against a directory on disk or an in-memory map in tests.
//!
//! Writers never touch the final file name directly: they write a temporary
//! file and rename it into place, so a reader either sees the previous
//! complete file or the new complete file.
//!
//! # Example
//!
//! ```
//! use modelseek::storage::Storage;
//! use modelseek::storage::memory::MemoryStorage;
//!
//! # fn main() -> modelseek::error::Result<()> {
//! let storage = MemoryStorage::new();
//! storage.write_atomic("index.bin", b"test data")?;
//! assert_eq!(storage.read_all("index.bin")?, b"test data");
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};

use crate::error::{ModelseekError, Result};

pub mod file;
pub mod memory;

/// A trait for storage backends that can store and retrieve named files.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open an existing file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a uniquely named temporary file, returning its name.
    fn create_temp_output(&self, prefix: &str) -> Result<(String, Box<dyn StorageOutput>)>;

    /// Rename a file, replacing any file already named `new_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Read a whole file.
    fn read_all(&self, name: &str) -> Result<Vec<u8>> {
        let mut input = self.open_input(name)?;
        let mut buffer = Vec::with_capacity(input.size()? as usize);
        input.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Write a whole file through a temporary file and a rename.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let (temp_name, mut output) = self.create_temp_output(name)?;
        let written = output
            .write_all(bytes)
            .map_err(ModelseekError::from)
            .and_then(|()| output.close());
        if let Err(e) = written {
            let _ = self.delete_file(&temp_name);
            return Err(e);
        }
        self.rename_file(&temp_name, name)
    }
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the size of the input stream.
    fn size(&self) -> Result<u64>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Close the output stream, making its content visible.
    fn close(&mut self) -> Result<()>;
}
