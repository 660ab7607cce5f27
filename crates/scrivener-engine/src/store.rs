//! Per-class output artifacts

use crate::error::EngineError;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// One append-only list-of-objects artifact per record class
///
/// The file holds a JSON array of stored records. Writes go to a temp file
/// and are renamed into place, so a crash mid-write never corrupts
/// previously persisted records.
pub struct OutputStore {
    path: PathBuf,
}

impl OutputStore {
    /// Store for the given class under the output directory
    pub fn new(output_dir: impl Into<PathBuf>, class: &str) -> Self {
        Self {
            path: output_dir.into().join(format!("{class}.json")),
        }
    }

    /// Path of the artifact
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load previously persisted records; a missing file is an empty list
    pub fn load(&self) -> Result<Vec<Value>, EngineError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        let body = fs::read_to_string(&self.path).map_err(|e| EngineError::Store {
            path: self.path.clone(),
            source: e,
        })?;
        let value: Value = serde_json::from_str(&body).map_err(|e| EngineError::CorruptStore {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        match value {
            Value::Array(records) => Ok(records),
            _ => Err(EngineError::CorruptStore {
                path: self.path.clone(),
                message: "expected a JSON array".to_string(),
            }),
        }
    }

    /// Persist the full record list atomically
    pub fn persist(&self, records: &[Value]) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::Store {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let body = serde_json::to_string_pretty(records)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, body).map_err(|e| EngineError::Store {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| EngineError::Store {
            path: self.path.clone(),
            source: e,
        })
    }
}
