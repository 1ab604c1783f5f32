/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Workflow persistence: a string-keyed JSON document store plus a
//! date-stamped file export.
//!
//! The store maps each key to one pretty-printed JSON file under its base
//! directory. Writes go through a temp file and rename so a crash mid-write
//! never leaves a half-written document behind the key.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use time::OffsetDateTime;
use time::macros::format_description;
use types::WorkflowDocument;

/// Store key used for the editor's autosaved workflow.
pub const WORKFLOW_STORE_KEY: &str = "workflow";

/// String-keyed workflow document store over a directory.
pub struct WorkflowStore {
    base_dir: PathBuf,
}

impl WorkflowStore {
    /// Open or create a store at the given directory
    pub fn open(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)
            .map_err(|e| StoreError::Io(format!("Failed to create store dir: {e}")))?;
        Ok(Self { base_dir })
    }

    /// Platform data directory for the editor's own store.
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("flowgraph"))
    }

    /// Base directory this store writes under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write a document under a key, replacing any previous value.
    pub fn save(&self, key: &str, document: &WorkflowDocument) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Parse(format!("Failed to serialize document: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| StoreError::Io(format!("Failed to commit {}: {e}", path.display())))?;

        debug!("Saved workflow document under key {key:?}");
        Ok(())
    }

    /// Read and parse the document stored under a key.
    ///
    /// Any failure leaves the caller's state untouched: the document is
    /// fully parsed before anything is returned.
    pub fn load(&self, key: &str) -> Result<WorkflowDocument, StoreError> {
        let path = self.key_path(key)?;
        let raw = fs::read_to_string(&path)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {e}", path.display())))?;
        let document: WorkflowDocument = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Parse(format!("Malformed workflow document: {e}")))?;
        document.check_version();
        Ok(document)
    }

    /// Whether a document exists under a key.
    pub fn contains(&self, key: &str) -> bool {
        self.key_path(key).map(|p| p.exists()).unwrap_or(false)
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Io("Store key must not be empty".to_string()));
        }
        if trimmed.contains(['/', '\\']) {
            return Err(StoreError::Io(format!(
                "Store key must not contain path separators: {trimmed:?}"
            )));
        }
        Ok(self.base_dir.join(format!("{trimmed}.json")))
    }
}

/// Write a document to `dir` under a date-stamped export name
/// (`workflow_YYYY-MM-DD.json`), the file-download analog. Returns the
/// path written.
pub fn export_document(document: &WorkflowDocument, dir: &Path) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir)
        .map_err(|e| StoreError::Io(format!("Failed to create export dir: {e}")))?;

    let date_format = format_description!("[year]-[month]-[day]");
    let date = OffsetDateTime::now_utc()
        .format(&date_format)
        .map_err(|e| StoreError::Io(format!("Failed to format export date: {e}")))?;
    let path = dir.join(format!("workflow_{date}.json"));

    let json = serde_json::to_string_pretty(document)
        .map_err(|e| StoreError::Parse(format!("Failed to serialize document: {e}")))?;
    fs::write(&path, json)
        .map_err(|e| StoreError::Io(format!("Failed to write {}: {e}", path.display())))?;

    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {e}"),
            StoreError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

/// Log a store error and discard it, for callers outside a Result path.
pub(crate) fn warn_on_error<T>(result: Result<T, StoreError>, context: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{context}: {e}");
            None
        },
    }
}
