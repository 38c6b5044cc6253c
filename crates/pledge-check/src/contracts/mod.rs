//! Contract types: preconditions and postconditions on guarded callables.
//!
//! Preconditions are checked before the body runs and see (a subset of) the
//! call's arguments; postconditions are checked after it returns and see the
//! return value. A failing predicate produces a [`ContractViolation`] that
//! propagates to the caller unmodified.

pub mod check;
pub mod predicate;
pub mod typespec;

use pledge_core::{CallableId, Value};
use serde::{Deserialize, Serialize};

pub use check::{check_postconditions, check_preconditions, PostconditionCheck, PreconditionCheck};
pub use predicate::{Bindings, Predicate};
pub use typespec::{collection_of, list_of, set_of, TypeSpec};

/// The kind of contract that was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    /// A precondition checked at function entry.
    Precondition,
    /// A postcondition checked at function return.
    Postcondition,
}

impl ContractKind {
    fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Precondition => "precondition",
            ContractKind::Postcondition => "postcondition",
        }
    }
}

/// A structured contract violation diagnostic.
///
/// Identifies the violated predicate by its label, the callable the
/// predicate is attached to (which, for inherited conditions, is the
/// ancestor's method), the predicate's bound inputs and, for
/// postconditions, the actual return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{} failure in {callable}: {label}", .kind.as_str())]
pub struct ContractViolation {
    /// What kind of contract was violated.
    pub kind: ContractKind,
    /// Source text or caller-supplied label of the failed predicate.
    pub label: String,
    /// Qualified name of the callable owning the predicate.
    pub callable: String,
    /// Identity of the callable owning the predicate.
    pub callable_id: CallableId,
    /// The values the predicate was evaluated with, by parameter name.
    pub inputs: Vec<(String, Value)>,
    /// For postconditions, the actual return value.
    pub actual_return: Option<Value>,
}

impl ContractViolation {
    pub fn is_precondition(&self) -> bool {
        self.kind == ContractKind::Precondition
    }

    pub fn is_postcondition(&self) -> bool {
        self.kind == ContractKind::Postcondition
    }

    /// JSON form of the diagnostic.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
