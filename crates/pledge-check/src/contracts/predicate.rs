//! Predicates: labeled truth tests over bound call arguments.
//!
//! A [`Predicate`] declares the parameter names it wants; the checker binds
//! each name to a value from the actual call (see
//! [`PreconditionCheck`](super::check::PreconditionCheck)) and hands the
//! result over as [`Bindings`]. The [`condition!`](crate::condition) macro
//! builds a predicate from closure syntax and keeps its source text as the
//! label, which is what violation diagnostics report.

use std::fmt;
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use pledge_core::Value;

/// Signature of the test closure behind a predicate.
pub type PredicateFn = dyn Fn(&Bindings) -> bool + Send + Sync;

static NEXT_SYNTHETIC_LABEL: AtomicU64 = AtomicU64::new(0);

/// A labeled truth test over named arguments.
#[derive(Clone)]
pub struct Predicate {
    params: Vec<String>,
    label: String,
    test: Arc<PredicateFn>,
}

impl Predicate {
    /// Creates a predicate over `params` with a synthetic label of the form
    /// `condition#N(x, y)`.
    pub fn new<I, S, F>(params: I, test: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Bindings) -> bool + Send + Sync + 'static,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let n = NEXT_SYNTHETIC_LABEL.fetch_add(1, Ordering::Relaxed);
        let label = format!("condition#{n}({})", params.join(", "));
        Predicate {
            params,
            label,
            test: Arc::new(test),
        }
    }

    /// Replaces the label reported on violation.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Declared parameter names, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn evaluate(&self, bindings: &Bindings) -> bool {
        (self.test)(bindings)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("params", &self.params)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Values a predicate is evaluated with.
///
/// `named` holds exactly the predicate's declared parameters; `positional`
/// is the positional view of the call (receiver removed, trailing
/// parameters back-filled), which positional type checks index into.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bindings {
    named: IndexMap<String, Value>,
    positional: Vec<Value>,
}

impl Bindings {
    pub fn new(named: IndexMap<String, Value>, positional: Vec<Value>) -> Self {
        Bindings { named, positional }
    }

    /// Bindings for a postcondition: `name` and position 0 both hold the
    /// return value.
    pub fn single(name: &str, value: &Value) -> Self {
        let mut named = IndexMap::with_capacity(1);
        named.insert(name.to_string(), value.clone());
        Bindings {
            named,
            positional: vec![value.clone()],
        }
    }

    /// Value bound to `name`; `Value::None` when absent.
    pub fn get(&self, name: &str) -> &Value {
        self.named.get(name).unwrap_or(Value::none_ref())
    }

    /// Value at position `index` of the positional view; `Value::None`
    /// past its end.
    pub fn positional(&self, index: usize) -> &Value {
        self.positional.get(index).unwrap_or(Value::none_ref())
    }

    /// Named inputs as owned pairs, for diagnostics.
    pub fn inputs(&self) -> Vec<(String, Value)> {
        if self.named.is_empty() {
            return self
                .positional
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("#{i}"), v.clone()))
                .collect();
        }
        self.named
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Index<&str> for Bindings {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name)
    }
}

/// Builds a [`Predicate`] from closure syntax.
///
/// Each closure parameter is bound to a `&Value` looked up by name, the body
/// is evaluated for truthiness, and the closure's source text becomes the
/// predicate's label:
///
/// ```
/// use pledge_check::condition;
///
/// let positive = condition!(|x, y| x > 0 && y > 0);
/// assert_eq!(positive.params(), ["x", "y"]);
/// assert!(positive.label().contains("x > 0"));
/// ```
#[macro_export]
macro_rules! condition {
    (|| $body:expr) => {
        $crate::contracts::Predicate::new(
            ::std::vec::Vec::<::std::string::String>::new(),
            |_: &$crate::contracts::Bindings| $crate::Truthy::is_truthy(&($body)),
        )
        .labeled(concat!("|| ", stringify!($body)))
    };
    (|$($param:ident),+ $(,)?| $body:expr) => {
        $crate::contracts::Predicate::new(
            [$(stringify!($param)),+],
            |bindings: &$crate::contracts::Bindings| {
                $(let $param = bindings.get(stringify!($param));)+
                $crate::Truthy::is_truthy(&($body))
            },
        )
        .labeled(concat!("|", stringify!($($param),+), "| ", stringify!($body)))
    };
}
