//! Diagnostics Module
//!
//! Build-time findings about annotated methods and their owner types, and the
//! channel they are reported through.

use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

use crate::key::MethodIdentity;

// == Severity ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// == Diagnostic Code ==
/// Stable codes for every diagnostic the engine can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Annotated method cannot be overridden
    #[serde(rename = "MEMO001")]
    NonOverridable,
    /// Annotated method calls itself
    #[serde(rename = "MEMO002")]
    SelfRecursive,
    /// Owner type cannot be extended
    #[serde(rename = "MEMO003")]
    SealedOwner,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::NonOverridable => "MEMO001",
            DiagnosticCode::SelfRecursive => "MEMO002",
            DiagnosticCode::SealedOwner => "MEMO003",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::NonOverridable | DiagnosticCode::SelfRecursive => Severity::Warning,
            DiagnosticCode::SealedOwner => Severity::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticCode::NonOverridable => "Method must be overridable",
            DiagnosticCode::SelfRecursive => "Recursive methods need extra care when cached",
            DiagnosticCode::SealedOwner => "Owner type cannot be extended",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Source Location ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

// == Fix ==
/// A mechanical change to the declarations that resolves a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fix {
    /// Switch a final method to virtual dispatch
    MakeOverridable { method: MethodIdentity },
}

impl Fix {
    pub fn title(&self) -> &'static str {
        match self {
            Fix::MakeOverridable { .. } => "Make method overridable",
        }
    }

    /// The method the fix rewrites.
    pub fn target(&self) -> &MethodIdentity {
        match self {
            Fix::MakeOverridable { method } => method,
        }
    }
}

// == Diagnostic ==
/// One reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Display name of the offending method or type
    pub subject: String,
    pub location: SourceLocation,
    /// Suggested fix, when one exists
    pub suggestion: Option<String>,
    /// Applicable form of the suggestion
    pub fix: Option<Fix>,
}

impl Diagnostic {
    /// `'name' should be declared overridable to be cached`, carrying the
    /// fix that makes it so.
    pub fn non_overridable(method: &MethodIdentity, location: SourceLocation) -> Self {
        let name = method.name();
        Self::build(
            DiagnosticCode::NonOverridable,
            format!("'{name}' should be declared overridable to be cached properly"),
            name,
            location,
        )
        .with_suggestion("declare the method overridable (virtual)")
        .with_fix(Fix::MakeOverridable {
            method: method.clone(),
        })
    }

    /// `'name' is recursive`, located at the recursive call site.
    pub fn self_recursive(method: &str, call_site: SourceLocation) -> Self {
        Self::build(
            DiagnosticCode::SelfRecursive,
            format!("'{method}' is recursive"),
            method,
            call_site,
        )
    }

    pub fn sealed_owner(type_name: &str, location: SourceLocation) -> Self {
        Self::build(
            DiagnosticCode::SealedOwner,
            format!("'{type_name}' cannot be extended, so its annotated methods cannot be cached"),
            type_name,
            location,
        )
    }

    fn build(
        code: DiagnosticCode,
        message: String,
        subject: &str,
        location: SourceLocation,
    ) -> Self {
        Self {
            code,
            severity: code.severity(),
            message,
            subject: subject.to_string(),
            location,
            suggestion: None,
            fix: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} at {}",
            self.severity, self.code, self.message, self.location
        )
    }
}

// == Diagnostic Sink ==
/// Channel through which diagnostics are surfaced to the build.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing` and keeps a count per severity.
#[derive(Debug, Default)]
pub struct TracingSink {
    pub warnings: usize,
    pub errors: usize,
}

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => {
                self.warnings += 1;
                warn!(code = %diagnostic.code, location = %diagnostic.location, "{}", diagnostic.message);
            }
            Severity::Error => {
                self.errors += 1;
                error!(code = %diagnostic.code, location = %diagnostic.location, "{}", diagnostic.message);
            }
        }
    }
}
