//! Declared parameter lists of guarded callables.
//!
//! A [`Signature`] is the explicit stand-in for runtime introspection: it is
//! declared once when a callable is created and cached by the contract
//! registry, so nothing about parameter names or defaults is re-derived per
//! call.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::args::{BoundArgs, CallArgs};
use crate::error::CoreError;
use crate::value::Value;

/// Name of the implicit receiver parameter. A signature whose first
/// parameter carries this name describes a method.
pub const RECEIVER: &str = "self";

/// A single declared parameter, with an optional default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Param {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// Ordered parameter list of a callable, including the receiver for methods.
///
/// Defaults must be trailing, as in any positional calling convention.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Creates a signature, validating unique names and trailing defaults.
    pub fn new(params: impl IntoIterator<Item = Param>) -> Result<Self, CoreError> {
        let params: Vec<Param> = params.into_iter().collect();
        let mut seen_default = false;
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(CoreError::DuplicateParameter {
                    name: param.name.clone(),
                });
            }
            match param.default {
                Some(_) => seen_default = true,
                None if seen_default => {
                    return Err(CoreError::NonDefaultAfterDefault {
                        name: param.name.clone(),
                    })
                }
                None => {}
            }
        }
        Ok(Signature { params })
    }

    /// Signature of required parameters only.
    pub fn of<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Param::required))
    }

    /// Whether the callable expects an implicit receiver as its first
    /// positional argument.
    pub fn is_method(&self) -> bool {
        self.params.first().is_some_and(|p| p.name == RECEIVER)
    }

    /// All declared parameters, receiver included.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared parameters without the receiver.
    pub fn arguments(&self) -> &[Param] {
        &self.params[self.receiver_offset()..]
    }

    pub fn has_defaults(&self) -> bool {
        self.params.iter().any(|p| p.default.is_some())
    }

    fn receiver_offset(&self) -> usize {
        usize::from(self.is_method())
    }

    /// The actual positional arguments (receiver removed), extended over the
    /// remaining declared parameters in order.
    ///
    /// A trailing parameter passed by keyword contributes the keyword value,
    /// otherwise its declared default; the extension stops at the first
    /// parameter with neither. Predicates zip their parameter names against
    /// this view, so defaulted-but-unsupplied parameters stay visible to them.
    pub fn positional_view(&self, args: &CallArgs) -> Vec<Value> {
        let actual = args
            .positional()
            .get(self.receiver_offset()..)
            .unwrap_or_default();
        let mut view: Vec<Value> = actual.to_vec();

        for param in self.arguments().iter().skip(actual.len()) {
            if let Some(value) = args.keyword(&param.name) {
                view.push(value.clone());
            } else if let Some(default) = &param.default {
                view.push(default.clone());
            } else {
                break;
            }
        }
        view
    }

    /// Binds actual arguments to every declared parameter: positional first,
    /// then keywords, then defaults.
    pub fn bind(&self, callable: &str, args: &CallArgs) -> Result<BoundArgs, CoreError> {
        if args.positional().len() > self.params.len() {
            return Err(CoreError::TooManyPositional {
                callable: callable.to_string(),
                expected: self.params.len(),
                given: args.positional().len(),
            });
        }

        let mut supplied: IndexMap<&str, &Value> = self
            .params
            .iter()
            .zip(args.positional())
            .map(|(p, v)| (p.name.as_str(), v))
            .collect();

        for (name, value) in args.keywords() {
            let Some(param) = self.params.iter().find(|p| &p.name == name) else {
                return Err(CoreError::UnexpectedKeyword {
                    callable: callable.to_string(),
                    name: name.clone(),
                });
            };
            if supplied.insert(param.name.as_str(), value).is_some() {
                return Err(CoreError::MultipleValues {
                    callable: callable.to_string(),
                    name: name.clone(),
                });
            }
        }

        let mut bound = IndexMap::with_capacity(self.params.len());
        for param in &self.params {
            let value = match (supplied.get(param.name.as_str()), &param.default) {
                (Some(value), _) => (*value).clone(),
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(CoreError::MissingArgument {
                        callable: callable.to_string(),
                        name: param.name.clone(),
                    })
                }
            };
            bound.insert(param.name.clone(), value);
        }
        Ok(BoundArgs::new(bound))
    }
}
