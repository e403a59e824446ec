//! JSON documents on disk
//!
//! Loads merge inputs from JSON files and renders merge results as pretty
//! or canonical (RFC 8785) JSON.

use clientkit_merge::{MergeError, Merger, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors reading, merging, or rendering documents
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error reading {}: {message}", path.display())]
    IoError { path: PathBuf, message: String },

    #[error("Parse error in {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Merge error: {0}")]
    MergeError(#[from] MergeError),

    #[error("Canonicalization error: {0}")]
    CanonicalError(String),

    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read and parse a JSON file
pub fn load_json(path: &Path) -> Result<Value, DocumentError> {
    let contents = fs::read_to_string(path).map_err(|e| DocumentError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let json: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| DocumentError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(path = %path.display(), bytes = contents.len(), "Loaded document");
    Ok(Value::from(json))
}

/// Load the destination and source files and merge them in order
pub fn merge_files(
    merger: &Merger,
    destination: &Path,
    sources: &[PathBuf],
) -> Result<Value, DocumentError> {
    let mut dest = load_json(destination)?;
    let loaded = sources
        .iter()
        .map(|p| load_json(p))
        .collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<&Value> = loaded.iter().collect();

    merger.merge(&mut dest, &refs)?;
    Ok(dest)
}

/// Canonical JSON bytes (RFC 8785)
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>, DocumentError> {
    serde_json_canonicalizer::to_vec(&value.to_json())
        .map_err(|e| DocumentError::CanonicalError(e.to_string()))
}

/// SHA-256 of the canonical bytes, hex encoded
pub fn digest(value: &Value) -> Result<String, DocumentError> {
    let bytes = canonical_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Render as canonical or pretty JSON
pub fn render(value: &Value, canonical: bool) -> Result<String, DocumentError> {
    if canonical {
        let bytes = canonical_bytes(value)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        Ok(serde_json::to_string_pretty(&value.to_json())?)
    }
}
