//! Persistence backends
//!
//! A backend only moves a whole file (header plus entity store) in and out of
//! storage. Ordering and id resolution are handled by the in-core [`Store`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::file::FileHeader;
use crate::store::Store;

/// Everything persisted for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub header: FileHeader,
    pub store: Store,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    header: &'a FileHeader,
    store: &'a Store,
}

/// Storage engine below a [`File`](crate::File)
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Read the stored file; `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<Snapshot>>;

    /// Persist the current state, replacing whatever was stored before.
    fn flush(&mut self, header: &FileHeader, store: &Store) -> Result<()>;
}

/// Keeps the last flushed state in memory only
#[derive(Debug, Default)]
pub struct MemoryBackend {
    flushed: Option<Snapshot>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&mut self) -> Result<Option<Snapshot>> {
        Ok(self.flushed.clone())
    }

    fn flush(&mut self, header: &FileHeader, store: &Store) -> Result<()> {
        self.flushed = Some(Snapshot {
            header: header.clone(),
            store: store.clone(),
        });
        Ok(())
    }
}

/// Stores the whole file as one JSON document
#[derive(Debug, Clone)]
pub struct JsonBackend {
    path: PathBuf,
}

impl JsonBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&mut self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        debug!(
            "loaded {} entities from {}",
            snapshot.store.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    fn flush(&mut self, header: &FileHeader, store: &Store) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&SnapshotRef { header, store })?;
        fs::write(&self.path, content)?;
        debug!("flushed {} entities to {}", store.len(), self.path.display());
        Ok(())
    }
}

/// Selectable backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    Memory,
    #[default]
    Json,
}

impl Implementation {
    pub const NAMES: [&'static str; 2] = ["memory", "json"];

    /// A fresh backend of this kind for the file at `path`
    pub fn backend(self, path: &Path) -> Box<dyn Backend> {
        match self {
            Implementation::Memory => Box::new(MemoryBackend::new()),
            Implementation::Json => Box::new(JsonBackend::new(path)),
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Memory => f.write_str("memory"),
            Implementation::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Implementation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Implementation::Memory),
            "json" => Ok(Implementation::Json),
            other => Err(ModelError::Config(format!(
                "unknown backend '{}', expected one of: {}",
                other,
                Implementation::NAMES.join(", ")
            ))),
        }
    }
}
