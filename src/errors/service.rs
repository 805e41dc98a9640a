use thiserror::Error;

use super::{GeneratorError, RepositoryError};

/// Error type for short link service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Empty or malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested code is already taken
    #[error("Short code '{0}' already exists")]
    AlreadyExists(String),

    /// No link is stored under the code
    #[error("Short code '{0}' not found")]
    NotFound(String),

    /// Every generated candidate collided with an existing code
    #[error("Failed to allocate a unique short code after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    /// The random source failed; the allocation is abandoned
    #[error(transparent)]
    CodeGeneration(#[from] GeneratorError),

    /// Storage failure passed through unchanged
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}
