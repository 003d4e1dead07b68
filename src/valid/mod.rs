//! Rule-based validation
//!
//! Findings come in two severities: violated `must` rules are errors and violated
//! `should` rules are warnings. `could` rules are gates that only evaluate their
//! nested rules when a guard holds. Validation never fails: problems with the data
//! are always reported as findings.

pub mod condition;
pub mod result;
pub mod rules;
pub mod traverse;

pub use condition::{Condition, could, evaluate, must, should};
pub use result::{Finding, Severity, ValidationResult};
pub use traverse::{ValidationOptions, validate_store};

use crate::store::Store;

/// An entity that can check its own fields
pub trait Validate {
    /// `store` is only used to resolve the entity's own weak references.
    fn validate(&self, store: &Store) -> ValidationResult;
}
