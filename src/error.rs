//! Error types for the memoization engine
//!
//! Provides unified error handling using thiserror. Failures raised by the
//! wrapped methods themselves never pass through this type.

use thiserror::Error;

// == Memo Error Enum ==
/// Unified error type for the memoization engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    /// A method identity was missing its owner type or method name
    #[error("Invalid method identity: {0}")]
    InvalidMethod(String),

    /// The owner type cannot be extended, so no decorator can wrap it
    #[error("Type '{0}' cannot be extended; caching cannot be applied")]
    SealedOwner(String),

    /// Decoration requested for a type with no annotated methods
    #[error("Type '{0}' has no methods marked for caching")]
    NoAnnotatedMethods(String),

    /// Runtime proxy used before its target instance was assigned
    #[error("Proxy not configured: no target instance has been set")]
    NotConfigured,

    /// Runtime proxy target assigned more than once
    #[error("Proxy already configured: the target instance cannot be replaced")]
    AlreadyConfigured,

    /// Process-wide method table installed (or read) before this install
    #[error("Method table already installed")]
    TableAlreadyInstalled,

    /// Annotation payload could not be parsed
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),
}

// == Result Type Alias ==
/// Convenience Result type for the memoization engine.
pub type Result<T> = std::result::Result<T, MemoError>;
