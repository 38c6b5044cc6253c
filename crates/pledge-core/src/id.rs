//! Stable ID newtypes for guarded callables and classes.
//!
//! Both IDs are distinct newtype wrappers over `u32`, so a `ClassId` cannot be
//! accidentally used where a `CallableId` is expected.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Identity of a callable. Plays the role of function-object identity when
/// contracts are looked up in the registry side-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallableId(pub u32);

/// Class identity within a [`ClassTable`](crate::class::ClassTable).
/// Maps to a petgraph `NodeIndex<u32>` in the inheritance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

static NEXT_CALLABLE_ID: AtomicU32 = AtomicU32::new(0);

impl CallableId {
    /// Allocates a fresh, process-unique callable identity.
    pub fn fresh() -> Self {
        CallableId(NEXT_CALLABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl ClassId {
    /// The root class every hierarchy derives from.
    pub const OBJECT: ClassId = ClassId(0);
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridge between ClassId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for ClassId {
    fn from(idx: NodeIndex<u32>) -> Self {
        ClassId(idx.index() as u32)
    }
}

impl From<ClassId> for NodeIndex<u32> {
    fn from(id: ClassId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_id_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(42);
        let class = ClassId::from(idx);
        assert_eq!(class.0, 42);

        let back: NodeIndex<u32> = class.into();
        assert_eq!(back.index(), 42);
    }

    #[test]
    fn fresh_callable_ids_are_distinct() {
        let a = CallableId::fresh();
        let b = CallableId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn display_prints_inner_value() {
        assert_eq!(format!("{}", ClassId(7)), "7");
        assert_eq!(format!("{}", CallableId(99)), "99");
    }
}
