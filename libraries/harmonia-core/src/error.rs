/// Core error types for Harmonia
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors reported by the library collaborator and core helpers
#[derive(Error, Debug)]
pub enum CoreError {
    /// The library service failed to answer
    #[error("Library error: {0}")]
    Library(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (folder, playlist, ...)
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a library error
    pub fn library(msg: impl Into<String>) -> Self {
        Self::Library(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
