//! The dispatch wrapper: the per-callable contract descriptor and the call
//! sequence that runs its conditions.
//!
//! A [`ContractDescriptor`] exists at most once per callable. It owns the
//! ordered precondition and postcondition lists, the original callable and,
//! once defined as a method, the class it belongs to.
//!
//! Inherited conditions are not stored here: they depend on the receiver's
//! class, so the registry resolves them per call and hands them to
//! [`ContractDescriptor::dispatch_with`].
//!
//! Call sequence:
//! 1. own preconditions,
//! 2. each ancestor's own preconditions, in resolution order,
//! 3. the body (its errors propagate unchanged),
//! 4. own postconditions,
//! 5. each ancestor's own postconditions.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use pledge_core::{CallArgs, CallableId, ClassId, CoreError, Signature, Value};

use crate::callable::{CallError, Callable};
use crate::contracts::check::{
    check_postconditions, check_preconditions, PostconditionCheck, PreconditionCheck,
};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Contract metadata for one guarded callable.
pub struct ContractDescriptor {
    callable: Arc<Callable>,
    preconditions: RwLock<Vec<PreconditionCheck>>,
    postconditions: RwLock<Vec<PostconditionCheck>>,
    /// The class the method is defined on, and its name.
    owner: RwLock<Option<(ClassId, String)>>,
}

impl ContractDescriptor {
    pub(crate) fn new(callable: Arc<Callable>) -> Self {
        ContractDescriptor {
            callable,
            preconditions: RwLock::new(Vec::new()),
            postconditions: RwLock::new(Vec::new()),
            owner: RwLock::new(None),
        }
    }

    pub fn callable(&self) -> &Arc<Callable> {
        &self.callable
    }

    pub fn id(&self) -> CallableId {
        self.callable.id()
    }

    pub fn signature(&self) -> &Signature {
        self.callable.signature()
    }

    /// `Class.method` once bound to a class, the bare name otherwise.
    pub fn qualname(&self) -> String {
        match read(&self.owner).as_ref() {
            Some((_, class)) => format!("{class}.{}", self.callable.name()),
            None => self.callable.name().to_string(),
        }
    }

    pub fn preconditions(&self) -> Vec<PreconditionCheck> {
        read(&self.preconditions).clone()
    }

    pub fn postconditions(&self) -> Vec<PostconditionCheck> {
        read(&self.postconditions).clone()
    }

    /// The class this method is defined on.
    pub fn owner_class(&self) -> Option<ClassId> {
        read(&self.owner).as_ref().map(|(class, _)| *class)
    }

    pub(crate) fn push_precondition(&self, check: PreconditionCheck) {
        write(&self.preconditions).push(check);
    }

    pub(crate) fn push_postcondition(&self, check: PostconditionCheck) {
        write(&self.postconditions).push(check);
    }

    /// Records the class this method is defined on. A method belongs to one
    /// class only; redefining it on the same class is allowed.
    pub(crate) fn bind_owner(&self, class: ClassId, class_name: String) -> Result<(), CoreError> {
        let mut owner = write(&self.owner);
        match owner.as_ref() {
            Some((bound, bound_name)) if *bound != class => Err(CoreError::MethodAlreadyBound {
                method: self.callable.name().to_string(),
                owner: bound_name.clone(),
                class: class_name,
            }),
            _ => {
                *owner = Some((class, class_name));
                Ok(())
            }
        }
    }

    fn check_own_preconditions(
        &self,
        signature: &Signature,
        args: &CallArgs,
    ) -> Result<(), CallError> {
        let checks = self.preconditions();
        let name = self.qualname();
        check_preconditions((name.as_str(), self.id()), &checks, signature, args)?;
        Ok(())
    }

    fn check_own_postconditions(&self, result: &Value) -> Result<(), CallError> {
        let checks = self.postconditions();
        let name = self.qualname();
        check_postconditions((name.as_str(), self.id()), &checks, result)?;
        Ok(())
    }

    /// Runs one call through the wrapper with the callable's own conditions.
    pub fn dispatch(&self, args: &CallArgs) -> Result<Value, CallError> {
        self.dispatch_with(args, &[])
    }

    /// Runs one call through the wrapper, replaying the conditions of
    /// `inherited` (same-named methods along the receiver's resolution
    /// order) after the callable's own. `inherited` is ignored unless the
    /// callable is a method.
    pub fn dispatch_with(
        &self,
        args: &CallArgs,
        inherited: &[Arc<ContractDescriptor>],
    ) -> Result<Value, CallError> {
        let signature = self.signature();
        let ancestors: &[Arc<ContractDescriptor>] = if signature.is_method() {
            inherited
        } else {
            &[]
        };
        tracing::trace!(
            callable = %self.qualname(),
            ancestors = ancestors.len(),
            "dispatching checked call"
        );

        self.check_own_preconditions(signature, args)?;
        for ancestor in ancestors {
            ancestor.check_own_preconditions(signature, args)?;
        }

        let result = self.callable.invoke(args)?;

        self.check_own_postconditions(&result)?;
        for ancestor in ancestors {
            ancestor.check_own_postconditions(&result)?;
        }

        Ok(result)
    }
}

impl fmt::Debug for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractDescriptor")
            .field("callable", &self.qualname())
            .field("preconditions", &read(&self.preconditions).len())
            .field("postconditions", &read(&self.postconditions).len())
            .finish()
    }
}
