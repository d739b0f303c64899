//! Decorator Plan Module
//!
//! Decides, per annotated method of one owner type, whether calls go through
//! the cache or are forwarded untouched.

use std::collections::HashMap;

use tracing::{error, info};

use crate::declaration::TypeDecl;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::eligibility::{check_method, check_recursion};
use crate::error::{MemoError, Result};
use crate::key::MethodIdentity;
use crate::policy::CachePolicy;

// == Call Mode ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Look up, call on miss, store under the policy
    Cached(CachePolicy),
    /// Forward with no key derivation and no storage
    PassThrough,
}

// == Method Plan ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPlan {
    pub mode: CallMode,
    /// Flagged as calling itself; caching still applies
    pub recursive: bool,
}

impl MethodPlan {
    pub fn is_cached(&self) -> bool {
        matches!(self.mode, CallMode::Cached(_))
    }
}

// == Decorator Plan ==
/// Per-method call handling for one decorated owner type.
///
/// Only annotated methods appear; everything else must be reached through
/// the wrapped instance directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorPlan {
    owner: String,
    methods: HashMap<MethodIdentity, MethodPlan>,
}

impl DecoratorPlan {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn method(&self, identity: &MethodIdentity) -> Option<&MethodPlan> {
        self.methods.get(identity)
    }

    pub fn methods(&self) -> impl Iterator<Item = (&MethodIdentity, &MethodPlan)> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn cached_count(&self) -> usize {
        self.methods.values().filter(|m| m.is_cached()).count()
    }
}

// == Synthesize ==
/// Builds the decorator plan for one owner type.
///
/// Every method of the type is checked for self recursion, whether or not a
/// plan comes out. A type with no annotated methods has nothing to plan. A
/// non-extensible owner with annotated methods is fatal: a `MEMO003` error is
/// reported and no plan is returned. Annotated methods of an extensible owner
/// are also checked for overridability, and the ones that fail fall back to
/// pass-through.
pub fn synthesize(ty: &TypeDecl, sink: &mut dyn DiagnosticSink) -> Result<DecoratorPlan> {
    if !ty.has_annotated_methods() {
        flag_recursion(ty, sink);
        return Err(MemoError::NoAnnotatedMethods(ty.name.clone()));
    }
    if !ty.extensible {
        error!(owner = %ty.name, "owner type cannot be extended");
        sink.report(Diagnostic::sealed_owner(&ty.name, ty.location.clone()));
        flag_recursion(ty, sink);
        return Err(MemoError::SealedOwner(ty.name.clone()));
    }

    let mut methods = HashMap::new();
    for method in &ty.methods {
        let eligibility = check_method(method, sink);
        let Some(policy) = method.policy() else {
            continue;
        };
        let mode = if eligibility.overridable {
            CallMode::Cached(policy)
        } else {
            CallMode::PassThrough
        };
        methods.insert(
            method.identity.clone(),
            MethodPlan {
                mode,
                recursive: eligibility.recursive,
            },
        );
    }

    let plan = DecoratorPlan {
        owner: ty.name.clone(),
        methods,
    };
    info!(
        owner = %plan.owner,
        methods = plan.len(),
        cached = plan.cached_count(),
        "decorator plan built"
    );
    Ok(plan)
}

fn flag_recursion(ty: &TypeDecl, sink: &mut dyn DiagnosticSink) {
    for method in &ty.methods {
        check_recursion(method, sink);
    }
}

// == Synthesize All ==
/// Outcome of planning a batch of declared types.
#[derive(Debug, Default)]
pub struct SynthesisReport {
    pub plans: Vec<DecoratorPlan>,
    /// Owner types that could not be decorated
    pub failures: Vec<MemoError>,
}

impl SynthesisReport {
    pub fn plan_for(&self, owner: &str) -> Option<&DecoratorPlan> {
        self.plans.iter().find(|plan| plan.owner == owner)
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Plans every type that owns at least one annotated method.
///
/// Declarations sharing a name are merged into one owner first, so a sealed
/// declaration seals the whole owner even if it carries no annotations.
/// Every method of every type is checked for self recursion. A sealed owner
/// is collected as a failure and does not stop the others.
pub fn synthesize_all(types: &[TypeDecl], sink: &mut dyn DiagnosticSink) -> SynthesisReport {
    let mut groups: Vec<TypeDecl> = Vec::new();
    for ty in types {
        match groups.iter_mut().find(|group| group.name == ty.name) {
            Some(group) => {
                group.extensible &= ty.extensible;
                group.methods.extend(ty.methods.iter().cloned());
            }
            None => groups.push(ty.clone()),
        }
    }

    let mut report = SynthesisReport::default();
    for group in &groups {
        match synthesize(group, sink) {
            Ok(plan) => report.plans.push(plan),
            Err(MemoError::NoAnnotatedMethods(_)) => {}
            Err(err) => report.failures.push(err),
        }
    }
    report
}
