//! File-backed key-value store scoped to one directory.
//!
//! Each key is one file named after the percent-escaped key with a `.json`
//! suffix. All access goes through a `cap_std` directory handle, so the store
//! cannot reach outside its root.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::atomic_io::{TEMP_PREFIX, write_atomic};
use crate::domain::StorageKey;
use crate::domain::ports::{KeyValueStore, StorageError};

const FILE_SUFFIX: &str = ".json";

/// Durable [`KeyValueStore`] keeping one file per key.
#[derive(Debug)]
pub struct FileStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the directory.
    pub fn open(root: &Utf8Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Rendered keys currently stored, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the directory cannot be
    /// listed.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.dir.entries().map_err(|err| self.unavailable(&err))?;
        let mut keys = Vec::new();
        for listed in entries {
            let entry = listed.map_err(|err| self.unavailable(&err))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(TEMP_PREFIX) {
                continue;
            }
            if let Some(key) = name.strip_suffix(FILE_SUFFIX).and_then(unescape_key) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn unavailable(&self, err: &io::Error) -> StorageError {
        StorageError::unavailable(format!("{}: {err}", self.root))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        match self.dir.read_to_string(file_name(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(
                StorageError::serialization(key.render(), err.to_string()),
            ),
            Err(err) => Err(self.unavailable(&err)),
        }
    }

    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.dir, &file_name(key), value).map_err(|err| self.unavailable(&err))?;
        debug!(%key, root = %self.root, "wrote store entry");
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        match self.dir.remove_file(file_name(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.unavailable(&err)),
        }
    }
}

fn file_name(key: &StorageKey) -> String {
    let mut name = escape_key(&key.render());
    name.push_str(FILE_SUFFIX);
    name
}

fn is_plain(byte: u8, position: usize) -> bool {
    match byte {
        b'.' => position > 0,
        b'-' | b'_' => true,
        _ => byte.is_ascii_alphanumeric(),
    }
}

/// Percent-escape every byte of `key` outside `[A-Za-z0-9._-]`, plus a
/// leading dot.
fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for (position, byte) in key.bytes().enumerate() {
        if is_plain(byte, position) {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

fn unescape_key(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut iter = name.bytes();
    while let Some(byte) = iter.next() {
        if byte == b'%' {
            let high = char::from(iter.next()?).to_digit(16)?;
            let low = char::from(iter.next()?).to_digit(16)?;
            bytes.push(u8::try_from(high * 16 + low).ok()?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok()
}
