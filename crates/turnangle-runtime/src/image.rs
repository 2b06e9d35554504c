//! Image payloads for vision requests.
//!
//! Bytes are sent exactly as they are on disk. The server decodes the image
//! itself; no resizing or re-encoding happens here.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Errors that can occur when loading an image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image file is empty: {0}")]
    Empty(PathBuf),
}

/// A base64-encoded image ready to embed in a generate request.
#[derive(Clone)]
pub struct ImagePayload {
    source: String,
    byte_len: usize,
    base64: String,
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("source", &self.source)
            .field("byte_len", &self.byte_len)
            .field("base64_len", &self.base64.len())
            .finish()
    }
}

impl ImagePayload {
    /// Load and encode an image file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(ImageError::Empty(path.to_path_buf()));
        }

        Ok(Self::from_bytes(path.display().to_string(), &bytes))
    }

    /// Encode in-memory image bytes. `source` is only used for logging.
    pub fn from_bytes(source: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            source: source.into(),
            byte_len: bytes.len(),
            base64: general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Where the image came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Size of the raw image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Standard-alphabet base64 of the raw bytes.
    pub fn base64(&self) -> &str {
        &self.base64
    }
}
