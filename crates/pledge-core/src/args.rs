//! Actual call arguments and the bound view handed to callable bodies.

use std::ops::Index;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::kind::ValueKind;
use crate::value::Value;

/// Arguments of a single call: positional values in order plus keyword
/// values in the order they were supplied. For methods the receiver is the
/// first positional value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: IndexMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional-only arguments.
    pub fn positional_from<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        CallArgs {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: IndexMap::new(),
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds (or replaces) a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Prepends a method receiver.
    pub fn with_receiver(mut self, receiver: Value) -> Self {
        self.positional.insert(0, receiver);
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.keyword.iter()
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every declared parameter of a callable bound to its value for one call.
///
/// Produced by [`Signature::bind`](crate::signature::Signature::bind); this is
/// what a callable body reads its arguments from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundArgs {
    values: IndexMap<String, Value>,
}

impl BoundArgs {
    pub fn new(values: IndexMap<String, Value>) -> Self {
        BoundArgs { values }
    }

    /// The value bound to `name`, or `Value::None` if there is no such
    /// parameter.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(Value::none_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// The receiver of a method call.
    pub fn receiver(&self) -> &Value {
        self.get(crate::signature::RECEIVER)
    }

    /// Reads an int argument, failing with a type mismatch otherwise.
    pub fn int(&self, name: &str) -> Result<i64, CoreError> {
        let value = self.get(name);
        value.as_int().ok_or_else(|| mismatch(name, ValueKind::Int, value))
    }

    /// Reads a str argument, failing with a type mismatch otherwise.
    pub fn str(&self, name: &str) -> Result<&str, CoreError> {
        let value = self.get(name);
        value.as_str().ok_or_else(|| mismatch(name, ValueKind::Str, value))
    }
}

fn mismatch(name: &str, expected: ValueKind, got: &Value) -> CoreError {
    CoreError::ArgumentType {
        name: name.to_string(),
        expected: expected.name().to_string(),
        got: got.type_name().to_string(),
    }
}

impl Index<&str> for BoundArgs {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_order() {
        let args = CallArgs::new().arg(1).kwarg("z", 3).kwarg("y", 2);
        assert_eq!(args.positional(), &[Value::Int(1)]);
        let names: Vec<&String> = args.keywords().map(|(k, _)| k).collect();
        assert_eq!(names, ["z", "y"]);
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn receiver_is_prepended() {
        let args = CallArgs::positional_from([1, 2]).with_receiver(Value::from("me"));
        assert_eq!(args.positional()[0], Value::from("me"));
        assert_eq!(args.positional().len(), 3);
    }

    #[test]
    fn bound_args_typed_access() {
        let mut values = IndexMap::new();
        values.insert("x".to_string(), Value::Int(4));
        values.insert("s".to_string(), Value::from("hi"));
        let bound = BoundArgs::new(values);

        assert_eq!(bound.int("x").unwrap(), 4);
        assert_eq!(bound.str("s").unwrap(), "hi");
        assert!(bound["missing"].is_none());

        let err = bound.int("s").unwrap_err();
        assert_eq!(err.to_string(), "argument 's' expected int, got str");
    }
}
