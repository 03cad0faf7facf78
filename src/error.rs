//! Error types for course outline extraction.
//!
//! Only failures that prevent a document from being read at all surface as
//! errors. Fields that cannot be determined are left empty and flagged for
//! review instead.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to read layout source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed layout in {path}: {message}")]
    MalformedLayout {
        path: PathBuf,
        message: String,
    },

    #[error("layout ingestor failed: {0}")]
    Ingestor(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid layout XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

impl ExtractionError {
    #[inline]
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[inline]
    pub fn malformed<P: AsRef<Path>>(path: P, message: impl Into<String>) -> Self {
        Self::MalformedLayout {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
