//! Guarded callables and the errors a call can produce.
//!
//! A [`Callable`] is the original, unwrapped function: identity, name,
//! declared signature and body. A [`Func`] is the handle user code holds and
//! calls; it is either the plain callable or the single checked wrapper
//! around it.

use std::fmt;
use std::sync::Arc;

use pledge_core::{BoundArgs, CallArgs, CallableId, CoreError, Signature, Value};

use crate::contracts::ContractViolation;
use crate::dispatch::ContractDescriptor;

/// Errors produced by calling a [`Func`].
///
/// Contract violations and errors raised by the body are kept apart: a body
/// error is never reported as a violation, and neither is ever caught or
/// rewritten on its way to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    /// Argument binding or body-side value extraction failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("'{class}' object has no method '{name}'")]
    NoSuchMethod { class: String, name: String },

    #[error("method receiver must be an object, got {got}")]
    NotAnObject { got: String },

    /// An error raised by the callable's body.
    #[error(transparent)]
    Raised(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    /// Wraps an arbitrary body failure.
    pub fn raised(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CallError::Raised(err.into())
    }

    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            CallError::Contract(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_precondition_failure(&self) -> bool {
        self.violation().is_some_and(ContractViolation::is_precondition)
    }

    pub fn is_postcondition_failure(&self) -> bool {
        self.violation().is_some_and(ContractViolation::is_postcondition)
    }
}

/// Body of a callable: reads its arguments from the bound view.
pub type Body = dyn Fn(&BoundArgs) -> Result<Value, CallError> + Send + Sync;

/// The original, unwrapped function.
pub struct Callable {
    id: CallableId,
    name: String,
    signature: Signature,
    body: Arc<Body>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Callable {
            id: CallableId::fresh(),
            name: name.into(),
            signature,
            body: Arc::new(body),
        }
    }

    pub fn id(&self) -> CallableId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Binds the arguments and runs the body, without any contract checks.
    pub fn invoke(&self, args: &CallArgs) -> Result<Value, CallError> {
        let bound = self.signature.bind(&self.name, args)?;
        (self.body)(&bound)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Handle to a callable as seen by its users.
#[derive(Debug, Clone)]
pub enum Func {
    /// No contracts attached (or contracts were disabled at decoration time).
    Plain(Arc<Callable>),
    /// The single dispatch wrapper around the callable.
    Checked(Arc<ContractDescriptor>),
}

impl Func {
    /// Creates a plain, unchecked function.
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Func::Plain(Arc::new(Callable::new(name, signature, body)))
    }

    /// Calls the function, running contracts when it is checked.
    pub fn call(&self, args: &CallArgs) -> Result<Value, CallError> {
        match self {
            Func::Plain(callable) => callable.invoke(args),
            Func::Checked(descriptor) => descriptor.dispatch(args),
        }
    }

    /// The original unwrapped callable.
    pub fn unwrapped(&self) -> &Arc<Callable> {
        match self {
            Func::Plain(callable) => callable,
            Func::Checked(descriptor) => descriptor.callable(),
        }
    }

    pub fn id(&self) -> CallableId {
        self.unwrapped().id()
    }

    pub fn name(&self) -> &str {
        self.unwrapped().name()
    }

    pub fn signature(&self) -> &Signature {
        self.unwrapped().signature()
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Func::Checked(_))
    }

    pub fn descriptor(&self) -> Option<&Arc<ContractDescriptor>> {
        match self {
            Func::Checked(descriptor) => Some(descriptor),
            Func::Plain(_) => None,
        }
    }
}

impl From<Callable> for Func {
    fn from(callable: Callable) -> Self {
        Func::Plain(Arc::new(callable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_call_binds_arguments() {
        let add = Func::new("add", Signature::of(["x", "y"]).unwrap(), |a| {
            Ok(Value::Int(a.int("x")? + a.int("y")?))
        });
        let out = add.call(&CallArgs::new().arg(1).kwarg("y", 2)).unwrap();
        assert_eq!(out, Value::Int(3));
        assert!(!add.is_checked());
        assert!(add.descriptor().is_none());
    }

    #[test]
    fn binding_errors_surface_as_core_errors() {
        let f = Func::new("f", Signature::of(["x"]).unwrap(), |_| Ok(Value::None));
        let err = f.call(&CallArgs::new()).unwrap_err();
        assert!(matches!(err, CallError::Core(CoreError::MissingArgument { .. })));
        assert!(err.violation().is_none());
    }

    #[test]
    fn raised_errors_are_kept_verbatim() {
        let f = Func::new("boom", Signature::default(), |_| Err(CallError::raised("kaboom")));
        let err = f.call(&CallArgs::new()).unwrap_err();
        assert!(matches!(err, CallError::Raised(_)));
        assert_eq!(err.to_string(), "kaboom");
        assert!(!err.is_precondition_failure());
    }
}
