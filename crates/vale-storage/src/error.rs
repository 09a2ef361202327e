//! Error types for vale-storage

use thiserror::Error;

/// Result type alias for vale-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vale-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (vale, cliente, ...)
        entity: &'static str,
        /// Requested id
        id: String,
    },

    /// A uniqueness rule or a concurrent update prevented the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error from the database driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Error while applying migrations
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned into a domain value
    #[error("Corrupt {entity} row: {message}")]
    Corrupt {
        /// Entity kind
        entity: &'static str,
        /// What failed to decode
        message: String,
    },

    /// Error from vale-core
    #[error("Core error: {0}")]
    Core(#[from] vale_core::Error),
}

impl Error {
    /// Creates a not-found error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Conflict(message.into())
    }

    /// Creates a corrupt-row error.
    pub fn corrupt(entity: &'static str, message: impl ToString) -> Self {
        Error::Corrupt {
            entity,
            message: message.to_string(),
        }
    }

    /// Maps a unique-constraint violation to [`Error::Conflict`], leaving any
    /// other driver error untouched.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            Error::Conflict(conflict.to_string())
        } else {
            Error::Database(err)
        }
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns `true` for [`Error::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
