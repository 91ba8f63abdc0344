//! Error types for the shaping engine

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using the engine error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the shaping engine
///
/// Client-input failures (`UnknownField`, `InvalidPage`) are detected before
/// storage is queried. The remaining variants signal broken invariants or
/// collaborator failures and are fatal for the current request.
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// A mapping for the resource/entity pair was registered twice
    #[error("Duplicate property mapping for {resource} -> {entity}")]
    DuplicateMapping {
        /// Resource type name
        resource: &'static str,
        /// Entity type name
        entity: &'static str,
    },

    /// No mapping registered for the resource/entity pair
    #[error("No property mapping registered for {resource} -> {entity}")]
    MappingNotFound {
        /// Resource type name
        resource: &'static str,
        /// Entity type name
        entity: &'static str,
    },

    /// An orderBy token could not be resolved against the mapping table
    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),

    /// Page index, page size or page contents are out of range
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// A projected field is missing from the shape's accessor table
    #[error("Field '{field}' does not exist on {shape}")]
    ShapeMismatch {
        /// Shape type name
        shape: &'static str,
        /// Requested field
        field: String,
    },

    /// A client-supplied field list names a field the shape does not have
    #[error("Unknown field '{field}' requested for {shape}")]
    UnknownField {
        /// Shape type name
        shape: &'static str,
        /// Requested field
        field: String,
    },

    /// Storage commit reported failure
    #[error("Save failed: {0}")]
    SaveFailed(String),

    /// Startup seeding gave up after exhausting its retry budget
    #[error("Seeding failed after {attempts} attempts: {last_error}")]
    SeedExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Message of the final failure
        last_error: String,
    },

    /// URI template rendering failed
    #[error("Route error: {0}")]
    Route(String),

    /// Storage collaborator error
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was caused by malformed client input
    ///
    /// ```rust
    /// use resource_shaping::Error;
    ///
    /// assert!(Error::InvalidPage("size must be positive".into()).is_client_error());
    /// assert!(!Error::SaveFailed("commit".into()).is_client_error());
    /// ```
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownField { .. } | Self::InvalidPage(_))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::UnknownField {
            shape: "PostResource",
            field: "nope".into()
        }
        .is_client_error());
        assert!(Error::InvalidPage("negative index".into()).is_client_error());
        assert!(!Error::UnknownSortField("title sideways".into()).is_client_error());
        assert!(!Error::ShapeMismatch {
            shape: "PostResource",
            field: "nope".into()
        }
        .is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::DuplicateMapping {
            resource: "PostResource",
            entity: "Post",
        };
        assert_eq!(
            err.to_string(),
            "Duplicate property mapping for PostResource -> Post"
        );

        let err = Error::SeedExhausted {
            attempts: 3,
            last_error: "store offline".into(),
        };
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_repository_error_conversion() {
        let err: Error =
            RepositoryError::storage_error(RepositoryOperation::Commit, "disk full").into();
        assert!(matches!(err, Error::Repository(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
