//! File-based KeyValueStore implementation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::{RepositoryError, Result};
use super::traits::KeyValueStore;

const EXTENSION: &str = "json";

/// File-based implementation of [`KeyValueStore`].
///
/// # File Format
///
/// Each key is stored as `{encoded_key}.json` under the base directory; the
/// file holds the value verbatim. Key bytes outside `[A-Za-z0-9._-]` are
/// percent-encoded, so any key maps to exactly one valid file name and
/// [`keys`](KeyValueStore::keys) can recover it.
///
/// Writes go to a temporary file first and are renamed into place.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(RepositoryError::InvalidKey(key.to_owned()));
        }
        Ok(self
            .base_dir
            .join(format!("{}.{EXTENSION}", encode_key(key))))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension(format!("{EXTENSION}.tmp"));

        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(target: "runtime::repository", key, path = %path.display(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(target: "runtime::repository", key, "Removed value");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(encoded) = filename.strip_suffix(".json")
                && let Some(key) = decode_key(encoded)
            {
                keys.push(key);
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
