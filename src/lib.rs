//! # nixmodel Library
//!
//! A typed entity model for scientific data files: containers of labeled
//! N-dimensional arrays with dimension descriptors, tags and features that
//! annotate them, provenance sources, and a hierarchical metadata tree of sections
//! and properties. Entities reference each other through stable ids, and the whole
//! graph can be checked by a rule engine that reports errors and warnings without
//! ever failing itself.
//!
//! ```no_run
//! use nixmodel::{File, FileMode};
//!
//! # fn main() -> nixmodel::Result<()> {
//! let mut file = File::open("session.nix", FileMode::Overwrite)?;
//! let block = file.create_container("session", "recording")?;
//! let store = file.store_mut()?;
//! let array = store.create_data_array(&block, "voltage", "signal")?;
//! if let Some(array) = store.data_array_mut(&array) {
//!     array.set_data_1d(vec![0.1, 0.2, 0.3]);
//! }
//!
//! let result = file.validate()?;
//! assert!(!result.has_errors());
//! file.close()?;
//! # Ok(())
//! # }
//! ```

pub mod associations;
pub mod backend;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod file;
mod float;
pub mod id;
pub mod output;
pub mod store;
pub mod units;
pub mod valid;
pub mod value;

pub use associations::{EntityWithMetadata, EntityWithSources, RefSet};
pub use backend::{Backend, Implementation, JsonBackend, MemoryBackend, Snapshot};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager, EnvProvider, SystemEnvProvider};
pub use entities::{
    Container, DataArray, Dimension, EntityKind, EntityWithFeatures, Feature, NamedEntity,
    PositionalTag, Property, RangeDimension, RegionTag, SampledDimension, Section, SetDimension,
    Source,
};
pub use error::{ModelError, Result};
pub use file::{File, FileHeader, FileMode};
pub use id::{EntityId, Identified};
pub use output::{FileReport, Output, ReportOutcome, Totals};
pub use store::Store;
pub use valid::{
    Finding, Severity, Validate, ValidationOptions, ValidationResult, validate_store,
};
pub use value::{DimensionKind, LinkType, Value, ValueType};
