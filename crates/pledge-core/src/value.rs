//! Runtime value representation for guarded calls.
//!
//! [`Value`] is the dynamic currency of the contract system: call arguments,
//! defaults, return values and predicate bindings are all `Value`s. Predicates
//! written with ordinary Rust operators work directly on them thanks to the
//! numeric comparison impls at the bottom of this module, e.g. `x > 0` for
//! `x: &Value`.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::ClassId;
use crate::kind::ValueKind;

/// A runtime value passed to or returned from a guarded callable.
///
/// `None` doubles as the absence sentinel: predicate parameters that no
/// actual argument fills are bound to `Value::None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Elements are unique and kept in first-insertion order.
    Set(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// An instance of a class registered in a [`ClassTable`](crate::class::ClassTable).
    Object {
        class: ClassId,
        fields: IndexMap<String, Value>,
    },
}

static NONE: Value = Value::None;

impl Value {
    /// Shared reference to the absence sentinel.
    pub fn none_ref() -> &'static Value {
        &NONE
    }

    /// Builds a set, dropping duplicate elements.
    pub fn set<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            let item = item.into();
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    pub fn list<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// A fresh instance of `class` with no fields.
    pub fn instance(class: ClassId) -> Value {
        Value::Object {
            class,
            fields: IndexMap::new(),
        }
    }

    /// Sets a field on an object value. Non-objects are returned unchanged.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Value {
        if let Value::Object { fields, .. } = &mut self {
            fields.insert(name.into(), value.into());
        }
        self
    }

    /// Returns the [`ValueKind`] of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
            Value::Object { class, .. } => ValueKind::Instance(*class),
        }
    }

    /// Returns a human-readable description of the value's type.
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: ints widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, tuple or set.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Class of an object value.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Value::Object { class, .. } => Some(*class),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } | Value::Map(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Numeric ordering against a float. Bools count as 0/1; everything
    /// else is unordered, so every comparison operator yields `false`.
    fn numeric_cmp(&self, other: f64) -> Option<Ordering> {
        match self {
            Value::Int(v) => (*v as f64).partial_cmp(&other),
            Value::Float(v) => v.partial_cmp(&other),
            Value::Bool(b) => (*b as i64 as f64).partial_cmp(&other),
            _ => None,
        }
    }

    fn int_cmp(&self, other: i64) -> Option<Ordering> {
        match self {
            Value::Int(v) => Some(v.cmp(&other)),
            Value::Bool(b) => Some((*b as i64).cmp(&other)),
            _ => self.numeric_cmp(other as f64),
        }
    }
}

/// Truth value of a predicate result.
///
/// Follows the usual dynamic-language convention: `None`, `false`, zero and
/// empty containers are falsy.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object { .. } => true,
        }
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(|v| v.is_truthy())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                join(f, items)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                join(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::Set(items) if items.is_empty() => write!(f, "set()"),
            Value::Set(items) => {
                write!(f, "{{")?;
                join(f, items)?;
                write!(f, "}}")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Object { class, .. } => write!(f, "<object of class {class}>"),
        }
    }
}

// Conversions into Value.

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// Comparisons against Rust scalars, for both `Value` and `&Value`.

macro_rules! impl_numeric_cmp {
    ($($ty:ty => $cmp:ident as $conv:ty),* $(,)?) => {
        $(
            impl PartialEq<$ty> for Value {
                fn eq(&self, other: &$ty) -> bool {
                    self.$cmp(*other as $conv) == Some(Ordering::Equal)
                }
            }

            impl PartialOrd<$ty> for Value {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    self.$cmp(*other as $conv)
                }
            }

            impl PartialEq<$ty> for &Value {
                fn eq(&self, other: &$ty) -> bool {
                    (**self).eq(other)
                }
            }

            impl PartialOrd<$ty> for &Value {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    (**self).partial_cmp(other)
                }
            }
        )*
    };
}

impl_numeric_cmp! {
    i32 => int_cmp as i64,
    i64 => int_cmp as i64,
    f64 => numeric_cmp as f64,
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comparisons_against_literals() {
        let x = Value::Int(10);
        assert!(x > 0);
        assert!(x >= 10);
        assert!(x == 10);
        assert!(!(x < 5));

        let r = &x;
        assert!(r > 5);
        assert!(r < 10.5);
    }

    #[test]
    fn non_numeric_values_are_unordered() {
        let s = Value::from("");
        assert!(!(s > 0));
        assert!(!(s < 0));
        assert!(!(s == 0));
        assert!(!(Value::None > 0));
    }

    #[test]
    fn string_equality() {
        assert!(Value::from("abc") == "abc");
        assert!(Value::Int(1) != "1");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::list([1]).is_truthy());
        assert!(!Value::set(Vec::<Value>::new()).is_truthy());
        assert!(Value::instance(ClassId(3)).is_truthy());
    }

    #[test]
    fn set_drops_duplicates() {
        let s = Value::set([1, 2, 1, 3, 2]);
        assert_eq!(s, Value::Set(vec![1.into(), 2.into(), 3.into()]));
    }

    #[test]
    fn display_is_repr_like() {
        assert_eq!(Value::from("a").to_string(), "\"a\"");
        assert_eq!(Value::list([1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::tuple([1]).to_string(), "(1,)");
        assert_eq!(Value::set([10, 11]).to_string(), "{10, 11}");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
    }

    #[test]
    fn from_json() {
        let v = Value::from(json!({"x": 1, "y": [true, null, 2.5, "s"]}));
        assert_eq!(v.field("x"), Some(&Value::Int(1)));
        assert_eq!(
            v.field("y"),
            Some(&Value::List(vec![
                Value::Bool(true),
                Value::None,
                Value::Float(2.5),
                Value::from("s"),
            ]))
        );
    }

    #[test]
    fn object_fields_and_kind() {
        let obj = Value::instance(ClassId(2)).with_field("n", 3);
        assert_eq!(obj.kind(), ValueKind::Instance(ClassId(2)));
        assert_eq!(obj.field("n"), Some(&Value::Int(3)));
        assert_eq!(obj.class_id(), Some(ClassId(2)));
    }

    #[test]
    fn serde_roundtrip() {
        let v = Value::list([Value::Int(1), Value::from("two"), Value::None]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
