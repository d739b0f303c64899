//! Method Identity Module
//!
//! Stable identifier for a declared method: owner type, method name and the
//! ordered parameter type signature.

use std::fmt;

use serde::Serialize;

use crate::error::{MemoError, Result};

// == Method Identity ==
/// Identifies one declared method. Overloads differ by parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodIdentity {
    owner: String,
    name: String,
    params: Vec<String>,
}

impl MethodIdentity {
    // == Constructor ==
    /// Creates an identity for `owner::name(params..)`.
    ///
    /// Fails if the owner type or method name is blank; a method without a
    /// declaring type cannot be keyed.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, params: &[&str]) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(MemoError::InvalidMethod(format!(
                "method '{name}' has no declaring type"
            )));
        }
        if name.trim().is_empty() {
            return Err(MemoError::InvalidMethod(format!(
                "empty method name on type '{owner}'"
            )));
        }
        Ok(Self {
            owner,
            name,
            params: params.iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Declaring-type-qualified name without the parameter signature.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner, self.name)
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}({})", self.owner, self.name, self.params.join(","))
    }
}
