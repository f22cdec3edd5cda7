//! Error types for the orchestration runtime

use thiserror::Error;

use crate::engine::EngineError;
use crate::persistence::StoreError;

/// Errors surfaced by managers, sessions, and the runtime context
#[derive(Debug, Error)]
pub enum CoreError {
    /// Lookup of an absent config or session
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate create
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A config points at a model/MCP/tool that does not resolve
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Mutation attempt on a built-in identifier
    #[error("reserved identifier: {0}")]
    ReservedId(String),

    /// Operation forbidden on a built-in config
    #[error("not permitted: {0}")]
    NotPermitted(String),

    /// Structural invariant violated on write
    #[error("validation error: {0}")]
    Validation(String),

    /// Concurrent-session cap exceeded
    #[error("maximum concurrent sessions limit ({0}) reached")]
    Overloaded(usize),

    /// Use before start, after stop, or double-start
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Storage backend failure
    #[error("store error: {0}")]
    Store(#[source] StoreError),

    /// Engine failure that escaped local recovery
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        // Missing and duplicate keys surface as the core lookup outcomes;
        // everything else keeps its store-error structure.
        match err {
            StoreError::NotFound { kind, key } => {
                CoreError::NotFound(format!("{kind} '{key}'"))
            }
            StoreError::AlreadyExists { kind, key } => {
                CoreError::AlreadyExists(format!("{kind} '{key}'"))
            }
            other => CoreError::Store(other),
        }
    }
}

/// Result alias for runtime operations
pub type CoreResult<T> = Result<T, CoreError>;
