use std::io;
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::types::VersionKey;
use crate::shared::storage_header::HeaderError;

/// Errors raised while building, persisting or loading a mapping index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid index header: {0}")]
    Header(#[from] HeaderError),

    #[error("Unexpected end of index file")]
    Truncated,

    #[error("Index corruption: {0}")]
    Corrupt(String),

    #[error("UTF-8 decode error in index: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl IndexError {
    /// Errors that mean the sidecar is unusable and should be rebuilt,
    /// as opposed to I/O failures on the source file.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            IndexError::Header(_)
                | IndexError::Truncated
                | IndexError::Corrupt(_)
                | IndexError::Utf8(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("I/O error reading fragment: {0}")]
    Io(#[from] io::Error),

    #[error("Fragment for {name} is not valid UTF-8")]
    Utf8 { name: String },

    #[error("Fragment store is closed")]
    Closed,

    #[error("Index unavailable: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No mapping file for {key}")]
    NotFound { key: VersionKey },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Fragment error: {0}")]
    Fragment(#[from] FragmentError),
}

impl EngineError {
    pub fn log_error(&self) {
        match self {
            EngineError::NotFound { key } => {
                debug!(target: "retrace::engine", %key, "Mapping not found");
            }
            EngineError::Io(e) => {
                warn!(target: "retrace::engine", error = %e, "Mapping I/O failed");
                debug!("Mapping I/O error details: {:?}", e);
            }
            EngineError::Index(e) => {
                warn!(target: "retrace::engine", error = %e, "Index build failed");
                debug!("Index error details: {:?}", e);
            }
            EngineError::Fragment(e) => {
                warn!(target: "retrace::engine", error = %e, "Fragment load failed");
                debug!("Fragment error details: {:?}", e);
            }
        }
    }
}
