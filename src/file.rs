//! The root entity
//!
//! A [`File`] owns the header (format, version, location, timestamps) and the
//! entity [`Store`], and mediates all access to them through its open state and
//! mode. Closing flushes to the backend and releases it; afterwards every access
//! to the store fails with [`ModelError::FileClosed`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Implementation};
use crate::entities::{EntityKind, Section};
use crate::error::{ModelError, Result};
use crate::id::{EntityId, Identified};
use crate::store::Store;
use crate::valid::{
    ValidationOptions, ValidationResult, could, evaluate, must, should, validate_store,
};

pub const FORMAT: &str = "nix";
pub const VERSION: &str = "1.0.0";

/// How a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Existing file; every mutation fails
    ReadOnly,
    /// Existing file, created when missing
    ReadWrite,
    /// Discard whatever was stored before
    Overwrite,
}

/// File-level fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    id: EntityId,
    format: String,
    version: String,
    location: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    open: bool,
}

impl FileHeader {
    pub(crate) fn new(id: EntityId, location: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            format: FORMAT.to_string(),
            version: VERSION.to_string(),
            location: location.to_string(),
            created_at: Some(now),
            updated_at: now,
            open: false,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// File-level rules. Only checked while the file is open, so a closed
    /// header always validates clean.
    pub fn validate(&self) -> ValidationResult {
        let rules = [could(
            |h: &FileHeader| h.open,
            vec![
                must(|h: &FileHeader| h.created_at.is_some(), "date is not set!"),
                should(|h: &FileHeader| !h.version.is_empty(), "version is not set!"),
                should(|h: &FileHeader| !h.format.is_empty(), "format is not set!"),
                should(|h: &FileHeader| !h.location.is_empty(), "location is not set!"),
            ],
        )];
        evaluate(&self.id, EntityKind::File, self, &rules)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identified for FileHeader {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// An open (or closed) data file
pub struct File {
    header: FileHeader,
    store: Store,
    mode: FileMode,
    path: PathBuf,
    backend: Option<Box<dyn Backend>>,
}

impl File {
    /// Open `path` with the default backend
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<File> {
        Self::open_with(path, mode, Implementation::default())
    }

    pub fn open_with(path: impl AsRef<Path>, mode: FileMode, implementation: Implementation) -> Result<File> {
        let path = path.as_ref();
        Self::with_backend(path, mode, implementation.backend(path))
    }

    /// Open `path` on an already constructed backend
    pub fn with_backend(path: impl AsRef<Path>, mode: FileMode, mut backend: Box<dyn Backend>) -> Result<File> {
        let path = path.as_ref().to_path_buf();
        let location = path.display().to_string();

        let loaded = match mode {
            FileMode::Overwrite => None,
            FileMode::ReadOnly | FileMode::ReadWrite => backend.load()?,
        };

        let (mut header, store, fresh) = match loaded {
            Some(snapshot) => (snapshot.header, snapshot.store, false),
            None if mode == FileMode::ReadOnly => {
                return Err(ModelError::FileNotFound { path });
            }
            None => {
                let header = FileHeader::new(EntityId::generate(), &location);
                let store = Store::new(header.id().clone());
                (header, store, true)
            }
        };
        header.open = true;

        if fresh {
            backend.flush(&header, &store)?;
        }
        info!(
            "opened {} ({} backend, {:?}, {} entities)",
            location,
            backend.name(),
            mode,
            store.len()
        );

        Ok(File {
            header,
            store,
            mode,
            path,
            backend: Some(backend),
        })
    }

    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn id(&self) -> &EntityId {
        &self.header.id
    }

    /// Write the current state to the backend without closing.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_writable()?;
        match self.backend.as_mut() {
            Some(backend) => backend.flush(&self.header, &self.store),
            None => Err(ModelError::FileClosed),
        }
    }

    /// Flush (unless read-only) and release the backend. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut backend) = self.backend.take() else {
            return Ok(());
        };
        self.header.open = false;
        if self.mode != FileMode::ReadOnly {
            backend.flush(&self.header, &self.store)?;
        }
        info!("closed {}", self.path.display());
        Ok(())
    }

    /// Read access to the entity graph
    pub fn store(&self) -> Result<&Store> {
        if !self.is_open() {
            return Err(ModelError::FileClosed);
        }
        Ok(&self.store)
    }

    /// Write access to the entity graph; stamps the file's update time.
    pub fn store_mut(&mut self) -> Result<&mut Store> {
        self.ensure_writable()?;
        self.header.touch();
        Ok(&mut self.store)
    }

    pub fn set_version(&mut self, version: &str) -> Result<()> {
        self.ensure_writable()?;
        self.header.version = version.to_string();
        self.header.touch();
        Ok(())
    }

    pub fn set_format(&mut self, format: &str) -> Result<()> {
        self.ensure_writable()?;
        self.header.format = format.to_string();
        self.header.touch();
        Ok(())
    }

    pub fn set_location(&mut self, location: &str) -> Result<()> {
        self.ensure_writable()?;
        self.header.location = location.to_string();
        self.header.touch();
        Ok(())
    }

    /// Overwrite the creation time; `None` clears it.
    pub fn force_created_at(&mut self, created_at: Option<DateTime<Utc>>) -> Result<()> {
        self.ensure_writable()?;
        self.header.created_at = created_at;
        Ok(())
    }

    pub fn create_container(&mut self, name: &str, entity_type: &str) -> Result<EntityId> {
        self.store_mut()?.create_container(name, entity_type)
    }

    pub fn create_section(&mut self, name: &str, entity_type: &str) -> Result<EntityId> {
        self.store_mut()?.create_section(name, entity_type)
    }

    pub fn container_count(&self) -> Result<usize> {
        Ok(self.store()?.container_count())
    }

    pub fn section_count(&self) -> Result<usize> {
        Ok(self.store()?.section_count())
    }

    /// See [`Store::find_sections`]
    pub fn find_sections<F>(&self, filter: F, max_depth: Option<usize>) -> Result<Vec<&Section>>
    where
        F: Fn(&Section) -> bool,
    {
        Ok(self.store()?.find_sections(filter, max_depth))
    }

    /// Validate the header and the whole entity graph with default options.
    pub fn validate(&self) -> Result<ValidationResult> {
        self.validate_with(&ValidationOptions::default())
    }

    pub fn validate_with(&self, options: &ValidationOptions) -> Result<ValidationResult> {
        let store = self.store()?;
        debug!("validating {} with {:?}", self.path.display(), options);
        let result = self.header.validate().concat(validate_store(store, options));
        info!(
            "{}: {} error(s), {} warning(s)",
            self.path.display(),
            result.error_count(),
            result.warning_count()
        );
        Ok(result)
    }

    fn ensure_writable(&self) -> Result<()> {
        if !self.is_open() {
            return Err(ModelError::FileClosed);
        }
        if self.mode == FileMode::ReadOnly {
            return Err(ModelError::ReadOnly {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close {}: {}", self.path.display(), e);
        }
    }
}
