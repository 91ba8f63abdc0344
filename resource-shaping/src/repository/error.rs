//! Storage collaborator error types
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Post", "42");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

/// Storage operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Counting entities matching a filter
    Count,
    /// Fetching one page of entities
    FetchPage,
    /// Fetching a single entity by ID
    FetchById,
    /// Staging a new entity
    Add,
    /// Staging a removal
    Remove,
    /// Staging a modification
    MarkUpdated,
    /// Applying staged changes
    Commit,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::FetchPage => write!(f, "fetch_page"),
            Self::FetchById => write!(f, "fetch_by_id"),
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::MarkUpdated => write!(f, "mark_updated"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// Category of storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Storage constraint violation
    ConstraintViolation,
    /// The collaborator could not apply the compiled sort
    InvalidSort,
    /// Underlying storage error
    StorageError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::InvalidSort => write!(f, "invalid_sort"),
            Self::StorageError => write!(f, "storage_error"),
        }
    }
}

/// Structured storage error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Post")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new storage error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::FetchById,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create an error for a sort step the collaborator cannot apply
    pub fn invalid_sort(property: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FetchPage,
            RepositoryErrorKind::InvalidSort,
            format!("cannot sort by '{}'", property.into()),
        )
    }

    /// Create a generic storage error
    pub fn storage_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::StorageError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
