//! File-based handoff between the manifest process and the tool
//!
//! The manifest process writes one serialized document; the tool reads it
//! after the manifest process has exited. The file is overwritten in full on
//! every write and is neither locked nor renamed into place, so two writers
//! sharing a path race. The tool avoids that by giving each evaluation its own
//! path ([`HandoffChannel::session`]) and passing it to the manifest process in
//! [`HANDOFF_ENV`].

use crate::errors::HandoffError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the handoff file for the manifest process
pub const HANDOFF_ENV: &str = "PACKCONF_HANDOFF";

/// File name of the shared, fixed handoff slot
pub const HANDOFF_FILE_NAME: &str = "package-config.json";

/// A handoff file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffChannel {
    path: PathBuf,
}

/// Snapshot of the handoff file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRecord {
    pub path: PathBuf,
    pub raw_bytes: Vec<u8>,
    pub exists: bool,
}

impl HandoffRecord {
    /// Parse the raw bytes as JSON into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, HandoffError> {
        serde_json::from_slice(&self.raw_bytes).map_err(|e| HandoffError::HandoffUnreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_bytes).into_owned()
    }
}

impl HandoffChannel {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        HandoffChannel { path: path.into() }
    }

    /// The fixed slot `<dir>/package-config.json`
    pub fn fixed(dir: &Path) -> Self {
        Self::at(dir.join(HANDOFF_FILE_NAME))
    }

    /// A slot unique to one evaluation, `<dir>/package-config-<uuid>.json`
    pub fn session(dir: &Path) -> Self {
        let id = uuid::Uuid::new_v4();
        Self::at(dir.join(format!("package-config-{}.json", id)))
    }

    /// The channel a manifest process should write to: the path announced in
    /// [`HANDOFF_ENV`], or the fixed slot in the temp directory.
    pub fn from_env() -> Self {
        match std::env::var_os(HANDOFF_ENV) {
            Some(path) if !path.is_empty() => Self::at(PathBuf::from(path)),
            _ => Self::fixed(&std::env::temp_dir()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or overwrite the handoff file
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), HandoffError> {
        let write_error = |source| HandoffError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        fs::write(&self.path, bytes).map_err(write_error)?;
        debug!("Written to path: {}", self.path.display());
        Ok(())
    }

    /// Serialize `value` as JSON and write it
    pub fn write_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), HandoffError> {
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|e| HandoffError::Encode(e.to_string()))?;
        self.write_bytes(&bytes)
    }

    /// Look at the handoff file without treating absence as an error
    pub fn inspect(&self) -> Result<HandoffRecord, HandoffError> {
        match fs::read(&self.path) {
            Ok(raw_bytes) => Ok(HandoffRecord {
                path: self.path.clone(),
                raw_bytes,
                exists: true,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HandoffRecord {
                path: self.path.clone(),
                raw_bytes: Vec::new(),
                exists: false,
            }),
            Err(e) => Err(HandoffError::HandoffUnreadable {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Read the handoff file; absence is [`HandoffError::HandoffMissing`]
    pub fn read(&self) -> Result<HandoffRecord, HandoffError> {
        let record = self.inspect()?;
        if !record.exists {
            debug!("Could not find a file at {}", self.path.display());
            return Err(HandoffError::HandoffMissing(self.path.clone()));
        }
        debug!("Got {} bytes from {}", record.raw_bytes.len(), self.path.display());
        Ok(record)
    }

    /// Read the handoff file for optional configuration; absence is `None`
    pub fn read_optional(&self) -> Result<Option<HandoffRecord>, HandoffError> {
        let record = self.inspect()?;
        if record.exists {
            Ok(Some(record))
        } else {
            debug!(
                "Could not find a file at {}, no configuration",
                self.path.display()
            );
            Ok(None)
        }
    }

    /// Remove the handoff file if present
    pub fn clear(&self) -> Result<(), HandoffError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(HandoffError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
