use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::event::bus::lock;

/// Storage medium behind a [`PresetStore`](crate::preset::PresetStore).
///
/// The store always reads or writes the whole image at once.
pub trait PresetFile: Send {
    /// Current contents. A medium that does not exist yet reads as empty.
    fn read(&mut self) -> io::Result<Vec<u8>>;

    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A preset file on disk.
#[derive(Debug, Clone)]
pub struct FsPresetFile {
    path: PathBuf,
}

impl FsPresetFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresetFile for FsPresetFile {
    fn read(&mut self) -> io::Result<Vec<u8>> {
        match fs::read(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            other => other,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)
    }
}

/// In-memory medium. Clones share the same bytes, so a test can keep one
/// handle and inspect what the store wrote through the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresetFile {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryPresetFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(bytes)),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        lock(&self.bytes).clone()
    }
}

impl PresetFile for MemoryPresetFile {
    fn read(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.contents())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        *lock(&self.bytes) = bytes.to_vec();
        Ok(())
    }
}
