//! # Backing File
//!
//! Positioned reads and writes over one store file. The seek cursor is shared,
//! so each access holds the handle's mutex for its seek and transfer.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub struct StoreFile {
    file: Mutex<File>,
}

impl StoreFile {
    /// Create a new file. Fails if `path` already exists.
    pub fn create_new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Ok(Self::from_file(file))
    }

    /// Create or truncate a file.
    pub fn create_truncate(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::from_file(file))
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }

    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Extend or shrink to `len`; new bytes read as zero.
    pub fn set_len(&self, len: u64) -> io::Result<()> {
        self.file.lock().set_len(len)
    }

    pub fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }

    pub fn write_all_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)
    }

    /// Flush file data and metadata to the device.
    pub fn sync(&self) -> io::Result<()> {
        let mut file = self.file.lock();
        file.flush()?;
        file.sync_all()
    }
}

/// Make a rename inside `dir` durable.
#[cfg(unix)]
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Directory handles cannot be synced on this platform; the rename itself is atomic.
#[cfg(not(unix))]
pub fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positioned_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let file = StoreFile::create_new(&path).unwrap();
        file.set_len(32).unwrap();
        file.write_all_at(8, b"digits").unwrap();

        let mut buf = [0u8; 6];
        file.read_exact_at(8, &mut buf).unwrap();
        assert_eq!(&buf, b"digits");
        assert_eq!(file.len().unwrap(), 32);

        assert!(StoreFile::create_new(&path).is_err());
    }

    #[test]
    fn test_read_past_end_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::create_new(&dir.path().join("short.bin")).unwrap();
        file.set_len(4).unwrap();
        let mut buf = [0u8; 8];
        assert!(file.read_exact_at(0, &mut buf).is_err());
    }
}
