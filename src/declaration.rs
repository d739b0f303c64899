//! Declaration Module
//!
//! The type and method model the host build hands to the engine.

use crate::diagnostics::{Diagnostic, Fix, SourceLocation};
use crate::key::MethodIdentity;
use crate::policy::{CacheAnnotation, CachePolicy};

// == Dispatch ==
/// How a declared method is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dispatch {
    Virtual,
    Abstract,
    Override,
    /// Cannot be overridden
    #[default]
    Final,
}

impl Dispatch {
    pub fn is_overridable(&self) -> bool {
        !matches!(self, Dispatch::Final)
    }
}

// == Call Site ==
/// A call made from inside a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub target: MethodIdentity,
    pub location: SourceLocation,
}

impl CallSite {
    pub fn new(target: MethodIdentity, location: SourceLocation) -> Self {
        Self { target, location }
    }
}

// == Method Declaration ==
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub identity: MethodIdentity,
    pub dispatch: Dispatch,
    /// Cache annotation, None for methods that are not cached
    pub annotation: Option<CacheAnnotation>,
    /// Calls made from the method body
    pub call_sites: Vec<CallSite>,
    pub location: SourceLocation,
}

impl MethodDecl {
    pub fn new(identity: MethodIdentity, dispatch: Dispatch) -> Self {
        Self {
            identity,
            dispatch,
            annotation: None,
            call_sites: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    pub fn annotated(mut self, annotation: CacheAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn calls(mut self, target: MethodIdentity, location: SourceLocation) -> Self {
        self.call_sites.push(CallSite::new(target, location));
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn is_annotated(&self) -> bool {
        self.annotation.is_some()
    }

    /// Policy derived from the annotation, if the method is annotated.
    pub fn policy(&self) -> Option<CachePolicy> {
        self.annotation.as_ref().map(CachePolicy::from_annotation)
    }

    /// Display name used in diagnostics.
    pub fn display_name(&self) -> &str {
        self.identity.name()
    }

    /// Applies `fix` if it targets this method. Returns whether anything changed.
    pub fn apply_fix(&mut self, fix: &Fix) -> bool {
        if fix.target() != &self.identity {
            return false;
        }
        match fix {
            Fix::MakeOverridable { .. } if self.dispatch == Dispatch::Final => {
                self.dispatch = Dispatch::Virtual;
                true
            }
            Fix::MakeOverridable { .. } => false,
        }
    }
}

// == Type Declaration ==
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    /// Whether the type can be extended by a decorator
    pub extensible: bool,
    pub methods: Vec<MethodDecl>,
    pub location: SourceLocation,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, extensible: bool) -> Self {
        Self {
            name: name.into(),
            extensible,
            methods: Vec::new(),
            location: SourceLocation::default(),
        }
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn annotated_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods.iter().filter(|m| m.is_annotated())
    }

    pub fn has_annotated_methods(&self) -> bool {
        self.methods.iter().any(MethodDecl::is_annotated)
    }

    /// Applies every fix carried by `diagnostics` to this type's methods.
    ///
    /// Returns the number of methods changed. Fixes for other types are
    /// ignored.
    pub fn apply_fixes<'a>(&mut self, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> usize {
        let mut applied = 0;
        for fix in diagnostics.into_iter().filter_map(|d| d.fix.as_ref()) {
            for method in &mut self.methods {
                if method.apply_fix(fix) {
                    applied += 1;
                }
            }
        }
        applied
    }
}
