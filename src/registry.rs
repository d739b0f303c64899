//! Method Table
//!
//! Maps every annotated method to its cache policy and overridability. The
//! process-wide table is built once at startup and never changes afterwards.

use std::collections::HashMap;

use once_cell::sync::{Lazy, OnceCell};
use tracing::info;

use crate::declaration::TypeDecl;
use crate::error::{MemoError, Result};
use crate::key::MethodIdentity;
use crate::policy::CachePolicy;

static GLOBAL_TABLE: OnceCell<MethodTable> = OnceCell::new();
static EMPTY_TABLE: Lazy<MethodTable> = Lazy::new(MethodTable::new);

// == Method Descriptor ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub policy: CachePolicy,
    pub overridable: bool,
}

// == Method Table ==
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: HashMap<MethodIdentity, MethodDescriptor>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every annotated method of every declared type.
    pub fn from_types(types: &[TypeDecl]) -> Self {
        let mut table = Self::new();
        for ty in types {
            for method in ty.annotated_methods() {
                if let Some(policy) = method.policy() {
                    table.insert(
                        method.identity.clone(),
                        MethodDescriptor {
                            policy,
                            overridable: method.dispatch.is_overridable(),
                        },
                    );
                }
            }
        }
        table
    }

    pub fn insert(&mut self, identity: MethodIdentity, descriptor: MethodDescriptor) {
        self.methods.insert(identity, descriptor);
    }

    /// Builder form of [`MethodTable::insert`] for an overridable method.
    pub fn with_method(mut self, identity: MethodIdentity, policy: CachePolicy) -> Self {
        self.insert(
            identity,
            MethodDescriptor {
                policy,
                overridable: true,
            },
        );
        self
    }

    pub fn lookup(&self, identity: &MethodIdentity) -> Option<&MethodDescriptor> {
        self.methods.get(identity)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    // == Global ==
    /// Installs `table` as the process-wide table.
    ///
    /// Fails if a table was already installed. Reads made through
    /// [`MethodTable::global`] beforehand do not block the install.
    pub fn install_global(table: MethodTable) -> Result<&'static MethodTable> {
        let count = table.len();
        GLOBAL_TABLE
            .set(table)
            .map_err(|_| MemoError::TableAlreadyInstalled)?;
        info!(methods = count, "method table installed");
        Ok(Self::global())
    }

    /// The process-wide table; empty until one is installed.
    pub fn global() -> &'static MethodTable {
        GLOBAL_TABLE.get().unwrap_or(&*EMPTY_TABLE)
    }
}
