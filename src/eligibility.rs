//! Eligibility Checker
//!
//! Two independent advisory checks: annotated methods must be overridable for
//! a decorator to wrap them, and any method calling itself directly is flagged.

use tracing::debug;

use crate::declaration::MethodDecl;
use crate::diagnostics::{Diagnostic, DiagnosticSink};

// == Eligibility ==
/// Outcome of checking one annotated method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    /// The decorator may install a caching wrapper
    pub overridable: bool,
    /// The method body calls itself directly
    pub recursive: bool,
}

/// Reports a warning if an annotated method cannot be overridden.
///
/// Returns whether the method is overridable. Unannotated methods are
/// always reported as not eligible and never produce a diagnostic.
pub fn check_overridable(method: &MethodDecl, sink: &mut dyn DiagnosticSink) -> bool {
    if !method.is_annotated() {
        return false;
    }
    let overridable = method.dispatch.is_overridable();
    if !overridable {
        sink.report(Diagnostic::non_overridable(
            &method.identity,
            method.location.clone(),
        ));
    }
    overridable
}

/// Reports one warning per call site that invokes the method itself.
///
/// Runs whether or not the method is annotated. Returns whether any such
/// call site exists. Only the exact identity counts; calls to an overload
/// with a different signature are not recursion.
pub fn check_recursion(method: &MethodDecl, sink: &mut dyn DiagnosticSink) -> bool {
    let mut recursive = false;
    for site in method
        .call_sites
        .iter()
        .filter(|site| site.target == method.identity)
    {
        recursive = true;
        sink.report(Diagnostic::self_recursive(
            method.display_name(),
            site.location.clone(),
        ));
    }
    recursive
}

/// Runs both checks on one method.
pub fn check_method(method: &MethodDecl, sink: &mut dyn DiagnosticSink) -> Eligibility {
    let eligibility = Eligibility {
        overridable: check_overridable(method, sink),
        recursive: check_recursion(method, sink),
    };
    debug!(
        method = %method.identity,
        overridable = eligibility.overridable,
        recursive = eligibility.recursive,
        "eligibility checked"
    );
    eligibility
}
