//! Data model for lambda-based design by contract.
//!
//! Runtime values, declared signatures, call arguments and the class
//! hierarchy that the contract checker in `pledge-check` operates on.

pub mod args;
pub mod class;
pub mod error;
pub mod id;
pub mod kind;
pub mod signature;
pub mod value;

// Re-export commonly used types
pub use args::{BoundArgs, CallArgs};
pub use class::{ClassDef, ClassTable, Mro};
pub use error::CoreError;
pub use id::{CallableId, ClassId};
pub use kind::ValueKind;
pub use signature::{Param, Signature, RECEIVER};
pub use value::{Truthy, Value};
