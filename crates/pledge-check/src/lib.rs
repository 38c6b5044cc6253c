//! Lambda-based design by contract.
//!
//! Attach preconditions and postconditions to a callable; they are checked
//! on every call. Preconditions see the call's arguments (each predicate
//! names the subset it wants), postconditions see the return value.
//!
//! Conditions are inherited: a checked method called through
//! [`ContractRegistry::invoke`] also runs the conditions of every same-named
//! checked method up the receiver's resolution order, so overrides can add
//! conditions but never drop them. [`ensure_checked`] wraps an override
//! without adding anything of its own.
//!
//! # Usage
//!
//! ```
//! use pledge_check::{condition, precondition, postcondition, CallArgs, Func, Signature, Value};
//!
//! let add = Func::new("add", Signature::of(["x", "y"]).unwrap(), |a| {
//!     Ok(Value::Int(a.int("x")? + a.int("y")?))
//! });
//! let add = precondition(condition!(|x, y| x > 0 && y > 0)).apply(add);
//! let add = postcondition(condition!(|rt| rt > 0)).apply(add);
//!
//! assert_eq!(add.call(&CallArgs::positional_from([10, 10])).unwrap(), Value::Int(20));
//! assert!(add.call(&CallArgs::new().arg(-1).kwarg("y", 10)).is_err());
//! ```

pub mod callable;
pub mod config;
pub mod contracts;
pub mod dispatch;
pub mod registry;

pub use callable::{Body, CallError, Callable, Func};
pub use config::ContractConfig;
pub use contracts::{
    collection_of, list_of, set_of, Bindings, ContractKind, ContractViolation, Predicate, TypeSpec,
};
pub use dispatch::ContractDescriptor;
pub use registry::{
    enabled, ensure_checked, postcondition, precondition, registry, returns, set_enabled, takes,
    ContractRegistry, Decorator,
};

pub use pledge_core::{
    BoundArgs, CallArgs, ClassId, ClassTable, CoreError, Param, Signature, Truthy, Value,
    ValueKind,
};
