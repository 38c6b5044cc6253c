//! Type specs: declarative argument and return shapes for `takes`/`returns`.
//!
//! A [`TypeSpec`] is one of:
//! - a concrete [`ValueKind`] the value must have (`Value::None` never
//!   satisfies a non-`None` kind),
//! - a union of specs with an explicit allow-absence flag,
//! - a container kind whose every element satisfies an element spec,
//! - a labeled one-argument test used directly as the truth test.
//!
//! Kinds follow the usual instance-of rules: a `bool` is also an `int`, and
//! an instance of a subclass satisfies `Instance(base)` whenever a
//! [`ClassTable`] is available to answer the subclass question. Decorators
//! built by a [`ContractRegistry`](crate::registry::ContractRegistry) always
//! check against the registry's class table.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use pledge_core::{ClassTable, Value, ValueKind};

use super::predicate::Predicate;

/// Signature of a custom element or value test.
pub type ValueTest = dyn Fn(&Value) -> bool + Send + Sync;

/// A declarative description of an acceptable value.
#[derive(Clone)]
pub enum TypeSpec {
    Kind(ValueKind),
    OneOf {
        specs: Vec<TypeSpec>,
        allow_none: bool,
    },
    Container {
        name: &'static str,
        element: Box<TypeSpec>,
        container: fn(&ValueKind) -> bool,
    },
    Test {
        label: String,
        test: Arc<ValueTest>,
    },
}

impl TypeSpec {
    pub fn kind(kind: ValueKind) -> Self {
        TypeSpec::Kind(kind)
    }

    /// Union of `specs`; absence is not accepted unless one of them accepts
    /// it or [`or_none`](Self::or_none) is applied.
    pub fn one_of<I, T>(specs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeSpec>,
    {
        TypeSpec::OneOf {
            specs: specs.into_iter().map(Into::into).collect(),
            allow_none: false,
        }
    }

    /// Accepts whatever `self` accepts, plus `Value::None`.
    pub fn or_none(self) -> Self {
        match self {
            TypeSpec::OneOf { specs, .. } => TypeSpec::OneOf {
                specs,
                allow_none: true,
            },
            other => TypeSpec::OneOf {
                specs: vec![other],
                allow_none: true,
            },
        }
    }

    /// A custom test, reported as `label` in diagnostics.
    pub fn test<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        TypeSpec::Test {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Whether `value` satisfies this spec. Instances only match their
    /// exact class here; see [`accepts_in`](Self::accepts_in).
    pub fn accepts(&self, value: &Value) -> bool {
        self.accepts_in(value, None)
    }

    /// Whether `value` satisfies this spec, resolving `Instance` kinds
    /// against `classes` so that subclass instances are accepted.
    pub fn accepts_in(&self, value: &Value, classes: Option<&ClassTable>) -> bool {
        match self {
            TypeSpec::Kind(kind) => kind_accepts(*kind, value, classes),
            TypeSpec::OneOf { specs, allow_none } => {
                (*allow_none && value.is_none())
                    || specs.iter().any(|s| s.accepts_in(value, classes))
            }
            TypeSpec::Container {
                element, container, ..
            } => {
                container(&value.kind())
                    && value
                        .items()
                        .is_some_and(|items| items.iter().all(|i| element.accepts_in(i, classes)))
            }
            TypeSpec::Test { test, .. } => test(value),
        }
    }
}

fn kind_accepts(kind: ValueKind, value: &Value, classes: Option<&ClassTable>) -> bool {
    match (kind, value.kind()) {
        (ValueKind::Int, ValueKind::Bool) => true,
        (ValueKind::Instance(expected), ValueKind::Instance(actual)) => {
            expected == actual
                || classes.is_some_and(|table| table.is_subclass(actual, expected).unwrap_or(false))
        }
        (expected, actual) => expected == actual,
    }
}

impl From<ValueKind> for TypeSpec {
    fn from(kind: ValueKind) -> Self {
        TypeSpec::Kind(kind)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Kind(kind) => write!(f, "{kind}"),
            TypeSpec::OneOf { specs, allow_none } => {
                write!(f, "one_of(")?;
                for (i, spec) in specs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{spec}")?;
                }
                if *allow_none {
                    if !specs.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "none")?;
                }
                write!(f, ")")
            }
            TypeSpec::Container { name, element, .. } => write!(f, "{name}({element})"),
            TypeSpec::Test { label, .. } => f.write_str(label),
        }
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSpec({self})")
    }
}

fn container_of(
    name: &'static str,
    element: TypeSpec,
    container: fn(&ValueKind) -> bool,
) -> TypeSpec {
    TypeSpec::Container {
        name,
        element: Box::new(element),
        container,
    }
}

/// A list whose elements all satisfy `element`.
pub fn list_of(element: impl Into<TypeSpec>) -> TypeSpec {
    container_of("list_of", element.into(), |k| *k == ValueKind::List)
}

/// A set whose elements all satisfy `element`.
pub fn set_of(element: impl Into<TypeSpec>) -> TypeSpec {
    container_of("set_of", element.into(), |k| *k == ValueKind::Set)
}

/// An ordered container (list or tuple) whose elements all satisfy
/// `element`.
pub fn collection_of(element: impl Into<TypeSpec>) -> TypeSpec {
    container_of("collection_of", element.into(), ValueKind::is_sequence)
}

/// Class table a registry-built type check resolves instances against.
pub(crate) type SharedClasses = Arc<RwLock<ClassTable>>;

/// Precondition checking position `i` of the positional view against
/// `specs[i]`.
pub(crate) fn takes_predicate(specs: Vec<TypeSpec>, classes: Option<SharedClasses>) -> Predicate {
    let label = format!(
        "takes({})",
        specs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Predicate::new(Vec::<String>::new(), move |bindings| {
        let table = classes
            .as_ref()
            .map(|c| c.read().unwrap_or_else(PoisonError::into_inner));
        specs
            .iter()
            .enumerate()
            .all(|(i, spec)| spec.accepts_in(bindings.positional(i), table.as_deref()))
    })
    .labeled(label)
}

/// Postcondition checking the return value against `spec`.
pub(crate) fn returns_predicate(spec: TypeSpec, classes: Option<SharedClasses>) -> Predicate {
    let label = format!("returns({spec})");
    Predicate::new(["result"], move |bindings| {
        let table = classes
            .as_ref()
            .map(|c| c.read().unwrap_or_else(PoisonError::into_inner));
        spec.accepts_in(bindings.get("result"), table.as_deref())
    })
    .labeled(label)
}
