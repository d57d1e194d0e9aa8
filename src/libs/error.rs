//! Typed failures of the storage core.
//!
//! [`StoreError`] is what the adapter reports; it never hides engine errors.
//! [`DataError`] is what the [`DataManager`](crate::libs::manager::DataManager)
//! returns after classifying adapter failures at its own operation boundary.

use crate::libs::bundle::ImportMode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The engine could not be opened or used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("read failed: {0}")]
    Read(String),

    /// A write failed; any transaction it was part of has been rolled back.
    #[error("write failed: {0}")]
    Write(String),
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(err.to_string())
    }

    pub fn read(err: impl std::fmt::Display) -> Self {
        StoreError::Read(err.to_string())
    }

    pub fn write(err: impl std::fmt::Display) -> Self {
        StoreError::Write(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("storage inaccessible: {0}")]
    StorageUnavailable(String),

    #[error("write failed, previous data kept: {0}")]
    WriteFailed(String),

    #[error("export failed: {0}")]
    ExportFailed(String),

    #[error("incompatible format version {}, expected {expected}", .found.as_deref().unwrap_or("<missing>"))]
    IncompatibleFormat { expected: String, found: Option<String> },

    #[error("import mode '{0}' is not supported")]
    UnsupportedMode(ImportMode),

    #[error("malformed bundle: {0}")]
    MalformedBundle(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl DataError {
    /// I/O failures may succeed when the user tries again; input errors will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::WriteFailed(_) | DataError::ExportFailed(_))
    }

    /// Errors rejected before anything was touched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DataError::IncompatibleFormat { .. } | DataError::UnsupportedMode(_) | DataError::MalformedBundle(_)
        )
    }

    /// Classification for operations that write.
    pub fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => DataError::StorageUnavailable(msg),
            StoreError::Write(msg) => DataError::WriteFailed(msg),
            StoreError::Read(msg) => DataError::Unknown(msg),
        }
    }

    /// Classification for export reads.
    pub fn from_export(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => DataError::StorageUnavailable(msg),
            StoreError::Read(msg) | StoreError::Write(msg) => DataError::ExportFailed(msg),
        }
    }
}
