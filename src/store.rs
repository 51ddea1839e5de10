//! Flat-file JSON document store.
//!
//! Both persisted documents (user registry and broadcast ledger) are loaded
//! and rewritten as a whole. [`DocStore`] owns that discipline: `load` never
//! fails (a missing or corrupt file is replaced by a default document and the
//! incident is logged), `save` ensures the parent directory exists and
//! rewrites the file atomically through a temp-file rename so a crash mid-write
//! cannot leave a torn document behind.
//!
//! The store is single-process, single-writer. Callers serialize their
//! read-modify-write cycles; see [`crate::registry`] and [`crate::ledger`].

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const TEMP_FILE_SUFFIX: &str = ".tmp";

/// Current on-disk schema version, written into document metadata.
pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document-level metadata carried by every persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: String,
    pub last_updated: String,
    pub version: String,
}

impl Default for Metadata {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            created_at: now.clone(),
            last_updated: now,
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

impl Metadata {
    /// Refresh `last_updated` to the current time.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now().to_rfc3339();
    }
}

/// A whole-document JSON store for a single serializable value.
#[derive(Debug)]
pub struct DocStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> DocStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, self-healing on any read or parse failure.
    ///
    /// A missing file is created with the default document. A corrupt file is
    /// logged and overwritten with the default document, so the process keeps
    /// running with a valid (if empty) store.
    pub fn load(&self) -> T {
        match fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(
                        "Corrupt document at {}, rewriting default: {e}",
                        self.path.display()
                    );
                    self.reset_to_default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.reset_to_default(),
            Err(e) => {
                error!("Failed to read {}: {e}", self.path.display());
                T::default()
            }
        }
    }

    /// Persist the whole document atomically.
    pub fn save(&self, doc: &T) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(doc)?;
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(TEMP_FILE_SUFFIX);
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn reset_to_default(&self) -> T {
        let doc = T::default();
        if let Err(e) = self.save(&doc) {
            error!(
                "Failed to write default document to {}: {e}",
                self.path.display()
            );
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        entries: BTreeMap<String, u64>,
        metadata: Metadata,
    }

    #[test]
    fn missing_file_yields_default_and_creates_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("doc.json");
        let store: DocStore<Doc> = DocStore::new(&path);

        let doc = store.load();
        assert!(doc.entries.is_empty());
        assert_eq!(doc.metadata.version, SCHEMA_VERSION);
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_replaced_by_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{not json at all").expect("write corrupt file");

        let store: DocStore<Doc> = DocStore::new(&path);
        let doc = store.load();
        assert!(doc.entries.is_empty());

        // The file on disk was rewritten to something parseable.
        let reloaded = store.load();
        assert_eq!(doc, reloaded);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: DocStore<Doc> = DocStore::new(dir.path().join("doc.json"));

        let mut doc = Doc::default();
        doc.entries.insert("a".into(), 1);
        doc.entries.insert("b".into(), 2);
        store.save(&doc).expect("save");

        assert_eq!(store.load(), doc);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.json");
        let store: DocStore<Doc> = DocStore::new(&path);
        store.save(&Doc::default()).expect("save");

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("doc.json")]);
    }
}
