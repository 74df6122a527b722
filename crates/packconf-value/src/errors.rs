use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding or decoding configuration values
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported value at {path}: {shape}")]
    UnsupportedValue { path: String, shape: String },

    #[error("No configuration type registered for alias '{0}'")]
    UnregisteredAlias(String),

    #[error("Alias '{alias}' is already registered for {registered}, cannot register {attempted}")]
    AliasConflict {
        alias: String,
        registered: &'static str,
        attempted: &'static str,
    },

    #[error("Payload for alias '{alias}' does not match {type_name}: {reason}")]
    PayloadMismatch {
        alias: String,
        type_name: &'static str,
        reason: String,
    },

    #[error("Configuration '{name}' has alias '{alias}', not the requested {expected}")]
    TypeMismatch {
        name: String,
        alias: String,
        expected: &'static str,
    },

    #[error("Alias '{alias}' decodes to {registered}, not the requested {expected}")]
    AliasTypeMismatch {
        alias: String,
        registered: &'static str,
        expected: &'static str,
    },

    #[error("No configuration named '{0}'")]
    MissingEntry(String),

    #[error("Failed to convert value: {0}")]
    Serialize(String),
}

/// Errors raised by the handoff file
#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("No configuration was handed off at {}", .0.display())]
    HandoffMissing(PathBuf),

    #[error("Handoff file {} is unreadable: {reason}", .path.display())]
    HandoffUnreadable { path: PathBuf, reason: String },

    #[error("Failed to encode handoff document: {0}")]
    Encode(String),

    #[error("Failed to write handoff file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
