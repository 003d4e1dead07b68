use std::path::PathBuf;

use thiserror::Error;

use crate::entities::EntityKind;

/// Contract violations raised at the call boundary.
///
/// Data-quality problems never show up here; they are reported as findings in a
/// [`ValidationResult`](crate::valid::ValidationResult).
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File is not open")]
    FileClosed,

    #[error("File was opened read-only: {path}")]
    ReadOnly { path: PathBuf },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Required field is empty: {field}")]
    EmptyField { field: &'static str },

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: String },

    #[error("Incompatible units: cannot scale {from} to {to}")]
    IncompatibleUnits { from: String, to: String },
}

impl ModelError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        ModelError::EntityNotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<crate::config::ConfigError> for ModelError {
    fn from(err: crate::config::ConfigError) -> Self {
        ModelError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let closed = ModelError::FileClosed;
        assert_eq!(closed.to_string(), "File is not open");

        let empty = ModelError::EmptyField { field: "name" };
        assert!(empty.to_string().contains("name"));

        let missing = ModelError::not_found(EntityKind::Container, "abc");
        assert_eq!(missing.to_string(), "Container not found: abc");

        let read_only = ModelError::ReadOnly {
            path: PathBuf::from("/data/session.nix.json"),
        };
        assert!(read_only.to_string().contains("session.nix.json"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let model_error: ModelError = io_error.into();

        match model_error {
            ModelError::Io(_) => (),
            _ => panic!("Expected ModelError::Io"),
        }
    }

    #[test]
    fn test_config_error_conversion() {
        let config_error = crate::config::ConfigError::Validation("bad value".to_string());
        let model_error: ModelError = config_error.into();

        match model_error {
            ModelError::Config(message) => assert!(message.contains("bad value")),
            _ => panic!("Expected ModelError::Config"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let model_error = ModelError::Io(io_error);

        assert!(model_error.source().is_some());
        assert_eq!(model_error.source().unwrap().to_string(), "File not found");
    }
}
