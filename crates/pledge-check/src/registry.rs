//! The contract registry: decoration operations, the side-table of contract
//! descriptors, and the class/method tables that inherited conditions are
//! resolved against.
//!
//! Inherited conditions follow the receiver: [`ContractRegistry::invoke`]
//! and [`ContractRegistry::call_method`] walk the resolution order of the
//! receiver's class on every call, so a base method defined after its
//! override still contributes, and a method inherited through multiple
//! bases picks up every sibling branch.
//!
//! Decorating is the only place the enable switch is read. With the switch
//! off, [`Decorator::apply`] and [`ContractRegistry::ensure_checked`] hand the
//! callable back untouched, so it runs with no checks at all. Callables that
//! were wrapped earlier are not affected by turning the switch off.
//!
//! A process-wide default registry, seeded from [`ContractConfig::from_env`],
//! backs the free functions at the bottom of this module.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use dashmap::DashMap;

use pledge_core::{CallArgs, CallableId, ClassId, ClassTable, CoreError, Value};

use crate::callable::{CallError, Func};
use crate::config::ContractConfig;
use crate::contracts::check::{PostconditionCheck, PreconditionCheck};
use crate::contracts::predicate::Predicate;
use crate::contracts::typespec::{returns_predicate, takes_predicate, SharedClasses, TypeSpec};
use crate::dispatch::ContractDescriptor;

/// What a decorator adds to the callable it is applied to.
#[derive(Debug, Clone)]
enum Attachment {
    Precondition(PreconditionCheck),
    Postcondition(PostconditionCheck),
}

/// A pending decoration, produced by [`ContractRegistry::precondition`] and
/// friends and consumed by [`apply`](Decorator::apply).
#[derive(Debug, Clone)]
#[must_use = "a decorator does nothing until applied"]
pub struct Decorator<'r> {
    registry: &'r ContractRegistry,
    attachment: Attachment,
}

impl Decorator<'_> {
    /// Attaches the condition to `func`, returning the checked wrapper (or
    /// `func` itself when contracts are disabled).
    pub fn apply(self, func: Func) -> Func {
        self.registry.attach(func, self.attachment)
    }
}

/// Owner of every contract descriptor, plus the classes and methods that
/// inherited conditions are looked up in.
#[derive(Debug)]
pub struct ContractRegistry {
    enabled: AtomicBool,
    descriptors: DashMap<CallableId, Arc<ContractDescriptor>>,
    classes: SharedClasses,
    methods: DashMap<(ClassId, String), Func>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::with_config(ContractConfig::default())
    }

    pub fn with_config(config: ContractConfig) -> Self {
        ContractRegistry {
            enabled: AtomicBool::new(config.enabled),
            descriptors: DashMap::new(),
            classes: Arc::new(RwLock::new(ClassTable::new())),
            methods: DashMap::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turns decoration on or off for callables decorated from now on.
    pub fn set_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "contract decoration switch changed");
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Decorator adding `predicate` as a precondition.
    pub fn precondition(&self, predicate: Predicate) -> Decorator<'_> {
        Decorator {
            registry: self,
            attachment: Attachment::Precondition(PreconditionCheck::new(predicate)),
        }
    }

    /// Decorator adding `predicate` as a postcondition on the return value.
    pub fn postcondition(&self, predicate: Predicate) -> Decorator<'_> {
        Decorator {
            registry: self,
            attachment: Attachment::Postcondition(PostconditionCheck::new(predicate)),
        }
    }

    /// Decorator requiring argument `i` to satisfy `specs[i]`. Instance
    /// kinds accept subclasses registered with this registry.
    pub fn takes<I, T>(&self, specs: I) -> Decorator<'_>
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeSpec>,
    {
        let specs = specs.into_iter().map(Into::into).collect();
        self.precondition(takes_predicate(specs, Some(self.classes.clone())))
    }

    /// Decorator requiring the return value to satisfy `spec`.
    pub fn returns(&self, spec: impl Into<TypeSpec>) -> Decorator<'_> {
        self.postcondition(returns_predicate(spec.into(), Some(self.classes.clone())))
    }

    /// Wraps `func` without adding a condition. Idempotent.
    pub fn ensure_checked(&self, func: Func) -> Func {
        if !self.enabled() {
            return func;
        }
        Func::Checked(self.wrap(&func))
    }

    /// Descriptor of a checked callable.
    pub fn descriptor(&self, id: CallableId) -> Option<Arc<ContractDescriptor>> {
        self.descriptors.get(&id).map(|d| d.value().clone())
    }

    /// Number of checked callables.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn attach(&self, func: Func, attachment: Attachment) -> Func {
        if !self.enabled() {
            tracing::debug!(callable = func.name(), "contracts disabled, leaving callable unwrapped");
            return func;
        }
        let descriptor = self.wrap(&func);
        match attachment {
            Attachment::Precondition(check) => {
                tracing::debug!(
                    callable = func.name(),
                    label = check.predicate().label(),
                    "attaching precondition"
                );
                descriptor.push_precondition(check);
            }
            Attachment::Postcondition(check) => {
                tracing::debug!(
                    callable = func.name(),
                    label = check.predicate().label(),
                    "attaching postcondition"
                );
                descriptor.push_postcondition(check);
            }
        }
        Func::Checked(descriptor)
    }

    /// The one descriptor for `func`'s underlying callable, created on first
    /// use.
    fn wrap(&self, func: &Func) -> Arc<ContractDescriptor> {
        let entry = self.descriptors.entry(func.id());
        let descriptor = match func {
            Func::Checked(existing) => entry.or_insert_with(|| existing.clone()),
            Func::Plain(callable) => entry.or_insert_with(|| {
                tracing::debug!(callable = callable.name(), "wrapping callable");
                Arc::new(ContractDescriptor::new(callable.clone()))
            }),
        };
        descriptor.value().clone()
    }

    // ------------------------------------------------------------------
    // Classes and methods
    // ------------------------------------------------------------------

    fn classes(&self) -> std::sync::RwLockReadGuard<'_, ClassTable> {
        self.classes.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a class deriving from `bases` (`object` when empty).
    pub fn define_class(&self, name: &str, bases: &[ClassId]) -> Result<ClassId, CoreError> {
        let id = self
            .classes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .define_class(name, bases)?;
        tracing::debug!(class = name, id = %id, "defined class");
        Ok(id)
    }

    /// Runs `f` with read access to the class table.
    pub fn with_classes<R>(&self, f: impl FnOnce(&ClassTable) -> R) -> R {
        f(&self.classes())
    }

    /// A fresh instance of `class`.
    pub fn instantiate(&self, class: ClassId) -> Result<Value, CoreError> {
        self.classes().get(class)?;
        Ok(Value::instance(class))
    }

    /// Defines `func` as a method named after it on `class`.
    ///
    /// A checked method belongs to the first class it is defined on;
    /// defining the same checked method on another class is an error.
    pub fn define_method(&self, class: ClassId, func: Func) -> Result<Func, CoreError> {
        let class_name = self.classes().get(class)?.name.clone();
        let name = func.name().to_string();

        if let Func::Checked(descriptor) = &func {
            descriptor.bind_owner(class, class_name.clone())?;
        }
        tracing::debug!(
            class = %class_name,
            method = %name,
            checked = func.is_checked(),
            "defined method"
        );

        self.methods.insert((class, name), func.clone());
        Ok(func)
    }

    /// Checked methods whose conditions a call of `method` on an instance of
    /// `receiver_class` inherits: for every class in the receiver's
    /// resolution order (without the receiver's class and `object`), the
    /// checked method that class itself defines under the same name. The
    /// called method itself is skipped, as are unchecked definitions.
    pub fn inherited_contracts(
        &self,
        receiver_class: ClassId,
        method: &Func,
    ) -> Result<Vec<Arc<ContractDescriptor>>, CoreError> {
        let Func::Checked(own) = method else {
            return Ok(Vec::new());
        };
        if !own.signature().is_method() {
            return Ok(Vec::new());
        }
        let ancestors = self.classes().ancestors(receiver_class)?;

        let mut inherited: Vec<Arc<ContractDescriptor>> = Vec::new();
        for class in ancestors {
            let Some(descriptor) = self
                .method(class, method.name())
                .and_then(|m| m.descriptor().cloned())
            else {
                continue;
            };
            let seen = Arc::ptr_eq(&descriptor, own)
                || inherited.iter().any(|d| Arc::ptr_eq(d, &descriptor));
            if !seen {
                inherited.push(descriptor);
            }
        }
        Ok(inherited)
    }

    /// The method `class` itself defines under `name`.
    pub fn method(&self, class: ClassId, name: &str) -> Option<Func> {
        self.methods
            .get(&(class, name.to_string()))
            .map(|m| m.value().clone())
    }

    /// Finds `name` along `class`'s resolution order.
    pub fn resolve_method(&self, class: ClassId, name: &str) -> Result<Option<Func>, CoreError> {
        let mro: Vec<ClassId> = self.classes().mro(class)?.to_vec();
        Ok(mro.into_iter().find_map(|c| self.method(c, name)))
    }

    /// Calls method `name` on `receiver`, which is prepended to `args`.
    pub fn invoke(&self, receiver: &Value, name: &str, args: CallArgs) -> Result<Value, CallError> {
        let class = receiver_class(receiver)?;
        let method = self.resolve_method(class, name)?.ok_or_else(|| CallError::NoSuchMethod {
            class: self
                .with_classes(|c| c.get(class).map(|def| def.name.clone()))
                .unwrap_or_else(|_| class.to_string()),
            name: name.to_string(),
        })?;
        self.call_method(receiver, &method, args)
    }

    /// Calls `method` with `receiver` prepended to `args`, running the
    /// conditions it inherits along the receiver's resolution order.
    pub fn call_method(
        &self,
        receiver: &Value,
        method: &Func,
        args: CallArgs,
    ) -> Result<Value, CallError> {
        let class = receiver_class(receiver)?;
        let args = args.with_receiver(receiver.clone());
        match method {
            Func::Checked(descriptor) => {
                let inherited = self.inherited_contracts(class, method)?;
                descriptor.dispatch_with(&args, &inherited)
            }
            Func::Plain(_) => method.call(&args),
        }
    }
}

fn receiver_class(receiver: &Value) -> Result<ClassId, CallError> {
    receiver.class_id().ok_or_else(|| CallError::NotAnObject {
        got: receiver.type_name().to_string(),
    })
}

impl Default for ContractRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------
// Process-wide default registry
// ----------------------------------------------------------------------

static DEFAULT_REGISTRY: OnceLock<ContractRegistry> = OnceLock::new();

/// The process-wide registry behind the free functions.
pub fn registry() -> &'static ContractRegistry {
    DEFAULT_REGISTRY.get_or_init(|| ContractRegistry::with_config(ContractConfig::from_env()))
}

pub fn precondition(predicate: Predicate) -> Decorator<'static> {
    registry().precondition(predicate)
}

pub fn postcondition(predicate: Predicate) -> Decorator<'static> {
    registry().postcondition(predicate)
}

pub fn ensure_checked(func: Func) -> Func {
    registry().ensure_checked(func)
}

pub fn takes<I, T>(specs: I) -> Decorator<'static>
where
    I: IntoIterator<Item = T>,
    T: Into<TypeSpec>,
{
    registry().takes(specs)
}

pub fn returns(spec: impl Into<TypeSpec>) -> Decorator<'static> {
    registry().returns(spec)
}

pub fn enabled() -> bool {
    registry().enabled()
}

pub fn set_enabled(enabled: bool) {
    registry().set_enabled(enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition;
    use pledge_core::Signature;

    fn identity() -> Func {
        Func::new("identity", Signature::of(["x"]).unwrap(), |a| Ok(a["x"].clone()))
    }

    #[test]
    fn wrapping_is_idempotent() {
        let registry = ContractRegistry::new();
        let f = registry.precondition(condition!(|x| x > 0)).apply(identity());
        let g = registry.precondition(condition!(|x| x < 10)).apply(f.clone());
        let h = registry.ensure_checked(g.clone());

        let (df, dg, dh) = (
            f.descriptor().unwrap(),
            g.descriptor().unwrap(),
            h.descriptor().unwrap(),
        );
        assert!(Arc::ptr_eq(df, dg));
        assert!(Arc::ptr_eq(dg, dh));
        assert_eq!(registry.len(), 1);
        assert_eq!(dh.preconditions().len(), 2);
    }

    #[test]
    fn decorating_copies_of_a_plain_func_shares_one_descriptor() {
        let registry = ContractRegistry::new();
        let plain = identity();
        let a = registry.precondition(condition!(|x| x > 0)).apply(plain.clone());
        let b = registry.postcondition(condition!(|r| r < 10)).apply(plain);
        assert!(Arc::ptr_eq(a.descriptor().unwrap(), b.descriptor().unwrap()));
        assert!(a.call(&CallArgs::positional_from([20])).is_err());
    }

    #[test]
    fn disabled_registry_returns_input() {
        let registry = ContractRegistry::with_config(ContractConfig { enabled: false });
        let f = registry.takes([pledge_core::ValueKind::Int]).apply(identity());
        assert!(!f.is_checked());
        assert!(registry.is_empty());
        assert_eq!(f.call(&CallArgs::positional_from([""])).unwrap(), Value::from(""));
    }

    #[test]
    fn invoke_rejects_non_objects_and_unknown_methods() {
        let registry = ContractRegistry::new();
        let class = registry.define_class("Empty", &[]).unwrap();
        let obj = registry.instantiate(class).unwrap();

        let err = registry.invoke(&Value::Int(1), "m", CallArgs::new()).unwrap_err();
        assert!(matches!(err, CallError::NotAnObject { .. }));

        let err = registry.invoke(&obj, "m", CallArgs::new()).unwrap_err();
        assert_eq!(err.to_string(), "'Empty' object has no method 'm'");
    }

    #[test]
    fn checked_method_belongs_to_one_class() {
        let registry = ContractRegistry::new();
        let base = registry.define_class("Base", &[]).unwrap();
        let sub = registry.define_class("Sub", &[base]).unwrap();
        let add = Func::new("add", Signature::of(["self", "x"]).unwrap(), |a| Ok(a["x"].clone()));
        let add = registry.precondition(condition!(|x| x > 0)).apply(add);

        registry.define_method(base, add.clone()).unwrap();
        registry.define_method(base, add.clone()).unwrap();
        let err = registry.define_method(sub, add.clone()).unwrap_err();
        assert!(matches!(err, CoreError::MethodAlreadyBound { ref class, .. } if class == "Sub"));
        assert!(registry.method(sub, "add").is_none());

        let obj = registry.instantiate(sub).unwrap();
        let err = registry
            .invoke(&obj, "add", CallArgs::new().arg(-1))
            .unwrap_err();
        assert_eq!(err.violation().unwrap().callable, "Base.add");
        assert!(registry.inherited_contracts(sub, &add).unwrap().is_empty());
    }
}
