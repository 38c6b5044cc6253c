//! Core error types for pledge-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the data model: class registration, resolution order
//! computation, signature declaration and argument binding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::ClassId;

/// Core errors produced by the pledge-core crate.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum CoreError {
    /// Attempting to register a class name that already exists.
    #[error("duplicate class name: '{name}'")]
    DuplicateClassName { name: String },

    /// A ClassId was not found in the class table.
    #[error("class not found: ClassId({id})", id = id.0)]
    ClassNotFound { id: ClassId },

    /// The bases of a class admit no consistent linearization.
    #[error("cannot create a consistent resolution order for class '{class}' (bases: {bases:?})")]
    InconsistentHierarchy { class: String, bases: Vec<String> },

    /// A checked method already defined on one class was defined on another.
    #[error("method '{method}' already belongs to class '{owner}', cannot define it on '{class}'")]
    MethodAlreadyBound {
        method: String,
        owner: String,
        class: String,
    },

    /// The same base was listed twice.
    #[error("duplicate base class '{base}' for class '{class}'")]
    DuplicateBase { class: String, base: String },

    /// A parameter name appears twice in a signature.
    #[error("duplicate parameter '{name}' in signature")]
    DuplicateParameter { name: String },

    /// A parameter without a default follows one with a default.
    #[error("non-default parameter '{name}' follows a default parameter")]
    NonDefaultAfterDefault { name: String },

    /// More positional arguments than declared parameters.
    #[error("{callable}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        callable: String,
        expected: usize,
        given: usize,
    },

    /// A keyword argument names no declared parameter.
    #[error("{callable}() got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { callable: String, name: String },

    /// A parameter was supplied both positionally and by keyword.
    #[error("{callable}() got multiple values for argument '{name}'")]
    MultipleValues { callable: String, name: String },

    /// A required parameter received no value.
    #[error("{callable}() missing required argument '{name}'")]
    MissingArgument { callable: String, name: String },

    /// A body read an argument as the wrong kind of value.
    #[error("argument '{name}' expected {expected}, got {got}")]
    ArgumentType {
        name: String,
        expected: String,
        got: String,
    },
}
