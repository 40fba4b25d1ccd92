//! Persistence of trained models
//!
//! A trained model is stored as one JSON document wrapped in a small
//! envelope recording the format version and the crate version that wrote
//! it. The payload is otherwise opaque: only the same format version can
//! read it back.
//!
//! There is no locking. Two processes saving to the same path race and the
//! last writer wins. Training is meant to be run by a single operator.

use crate::error::{ForecastError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Version of the artifact layout
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<M> {
    format_version: u32,
    crate_version: String,
    model: M,
}

/// Save and load trained models
#[derive(Debug)]
pub struct ModelArtifact;

impl ModelArtifact {
    /// Serialize `model` to `path`, replacing any existing artifact
    ///
    /// The document is written to a temporary file in the same directory
    /// and renamed over `path`, so a failed write leaves the previous
    /// artifact untouched.
    pub fn save<M: Serialize, P: AsRef<Path>>(path: P, model: &M) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let envelope = Envelope {
            format_version: FORMAT_VERSION,
            crate_version: crate::VERSION.to_string(),
            model,
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| ForecastError::Io(e.error))?;

        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Load a model saved by [`ModelArtifact::save`]
    ///
    /// Any failure (missing file, unreadable file, foreign or corrupted
    /// content) is reported as [`ForecastError::ModelArtifactMissing`].
    pub fn load<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M> {
        let path = path.as_ref();
        let missing = |reason: String| ForecastError::ModelArtifactMissing {
            path: path.display().to_string(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| missing(e.to_string()))?;
        let envelope: Envelope<M> =
            serde_json::from_slice(&bytes).map_err(|e| missing(format!("unreadable artifact: {}", e)))?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(missing(format!(
                "artifact format {} written by version {} is not supported (expected format {})",
                envelope.format_version, envelope.crate_version, FORMAT_VERSION
            )));
        }

        info!(path = %path.display(), written_by = %envelope.crate_version, "loaded model artifact");
        Ok(envelope.model)
    }

    /// Whether an artifact file exists at `path`
    pub fn exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }
}
