//! Memo Decorator - attribute-driven method memoization
//!
//! Validates annotated methods, plans a decorator per owner type, and caches
//! each planned call under a key derived from the method and its arguments,
//! with absolute and sliding expiration per method.

pub mod cache;
pub mod config;
pub mod declaration;
pub mod decorator;
pub mod diagnostics;
pub mod eligibility;
pub mod error;
pub mod key;
pub mod policy;
pub mod proxy;
pub mod registry;
pub mod telemetry;

pub use cache::{CacheStats, CacheStore, ExpiringStore};
pub use config::Config;
pub use declaration::{Dispatch, MethodDecl, TypeDecl};
pub use decorator::{synthesize, synthesize_all, Decorated, DecoratorPlan};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Fix, SourceLocation};
pub use error::{MemoError, Result};
pub use key::{derive_key, CacheKey, KeyArg, MethodIdentity};
pub use policy::{CacheAnnotation, CachePolicy, HashAlgorithm};
pub use proxy::CacheProxy;
pub use registry::MethodTable;
