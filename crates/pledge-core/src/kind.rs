//! Value kinds: the concrete "types" a type spec can require.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ClassId;

/// The concrete kind of a [`Value`](crate::value::Value).
///
/// Kinds themselves compare by exact class. Whether an instance of a
/// subclass satisfies an `Instance` kind is answered against the
/// [`ClassTable`](crate::class::ClassTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    None,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Set,
    Map,
    Instance(ClassId),
}

impl ValueKind {
    /// Short lowercase name, as it appears in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::None => "none",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::List => "list",
            ValueKind::Tuple => "tuple",
            ValueKind::Set => "set",
            ValueKind::Map => "map",
            ValueKind::Instance(_) => "object",
        }
    }

    /// Whether this kind is an ordered sequence (list or tuple).
    pub fn is_sequence(&self) -> bool {
        matches!(self, ValueKind::List | ValueKind::Tuple)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Instance(class) => write!(f, "object<{class}>"),
            other => f.write_str(other.name()),
        }
    }
}
