//! Class hierarchy and resolution order.
//!
//! [`ClassTable`] is the explicit model of the classes whose methods carry
//! contracts. Inheritance is stored as a petgraph graph with one edge per
//! `child -> base` link (the edge weight is the base's position in the
//! declaration), and every class caches its C3 resolution order when it is
//! defined. The root class `object` is pre-registered as [`ClassId::OBJECT`].

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::id::ClassId;

/// Resolution order of a class: the class itself first, `object` last.
pub type Mro = SmallVec<[ClassId; 4]>;

/// A registered class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub id: ClassId,
    pub name: String,
    pub mro: Mro,
}

/// Registry of classes and their inheritance graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTable {
    /// Nodes are classes, edges point from a class to each of its bases.
    graph: DiGraph<ClassDef, u32>,
    names: HashMap<String, ClassId>,
}

impl ClassTable {
    pub const ROOT_NAME: &'static str = "object";

    /// Creates a table containing only the root class.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let mut root_mro = Mro::new();
        root_mro.push(ClassId::OBJECT);
        let idx = graph.add_node(ClassDef {
            id: ClassId::OBJECT,
            name: Self::ROOT_NAME.to_string(),
            mro: root_mro,
        });
        debug_assert_eq!(ClassId::from(idx), ClassId::OBJECT);

        let mut names = HashMap::new();
        names.insert(Self::ROOT_NAME.to_string(), ClassId::OBJECT);
        ClassTable { graph, names }
    }

    /// Defines a class deriving from `bases` (in declaration order). An empty
    /// base list derives from `object`.
    pub fn define_class(&mut self, name: &str, bases: &[ClassId]) -> Result<ClassId, CoreError> {
        if self.names.contains_key(name) {
            return Err(CoreError::DuplicateClassName {
                name: name.to_string(),
            });
        }

        let bases: Vec<ClassId> = if bases.is_empty() {
            vec![ClassId::OBJECT]
        } else {
            bases.to_vec()
        };
        for (i, base) in bases.iter().enumerate() {
            let base_def = self.get(*base)?;
            if bases[..i].contains(base) {
                return Err(CoreError::DuplicateBase {
                    class: name.to_string(),
                    base: base_def.name.clone(),
                });
            }
        }

        let linearized = self.linearize(&bases).ok_or_else(|| CoreError::InconsistentHierarchy {
            class: name.to_string(),
            bases: bases.iter().map(|b| self.name_of(*b)).collect(),
        })?;

        // The new node's index is the next one in the graph.
        let id = ClassId(self.graph.node_count() as u32);
        let mut mro = Mro::new();
        mro.push(id);
        mro.extend(linearized);

        let idx = self.graph.add_node(ClassDef {
            id,
            name: name.to_string(),
            mro,
        });
        for (position, base) in bases.iter().enumerate() {
            self.graph.add_edge(idx, (*base).into(), position as u32);
        }
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a class by id.
    pub fn get(&self, id: ClassId) -> Result<&ClassDef, CoreError> {
        self.graph
            .node_weight(NodeIndex::from(id))
            .ok_or(CoreError::ClassNotFound { id })
    }

    pub fn get_by_name(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    /// Resolution order of `class`, starting with the class itself.
    pub fn mro(&self, class: ClassId) -> Result<&[ClassId], CoreError> {
        Ok(&self.get(class)?.mro)
    }

    /// Ancestors of `class` whose methods contribute inherited conditions:
    /// the resolution order without the class itself and without `object`.
    pub fn ancestors(&self, class: ClassId) -> Result<Vec<ClassId>, CoreError> {
        Ok(self
            .mro(class)?
            .iter()
            .skip(1)
            .copied()
            .filter(|c| *c != ClassId::OBJECT)
            .collect())
    }

    /// Direct bases of `class`, in declaration order.
    pub fn bases(&self, class: ClassId) -> Result<Vec<ClassId>, CoreError> {
        self.get(class)?;
        let mut edges: Vec<(u32, ClassId)> = self
            .graph
            .edges_directed(class.into(), Direction::Outgoing)
            .map(|e| (*e.weight(), ClassId::from(e.target())))
            .collect();
        edges.sort_by_key(|(position, _)| *position);
        Ok(edges.into_iter().map(|(_, base)| base).collect())
    }

    /// Classes that list `class` as a direct base.
    pub fn direct_subclasses(&self, class: ClassId) -> Result<Vec<ClassId>, CoreError> {
        self.get(class)?;
        let mut subs: Vec<ClassId> = self
            .graph
            .neighbors_directed(class.into(), Direction::Incoming)
            .map(ClassId::from)
            .collect();
        subs.sort();
        Ok(subs)
    }

    /// Whether `child` is `parent` or derives from it.
    pub fn is_subclass(&self, child: ClassId, parent: ClassId) -> Result<bool, CoreError> {
        Ok(self.mro(child)?.contains(&parent))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn name_of(&self, class: ClassId) -> String {
        self.get(class)
            .map(|def| def.name.clone())
            .unwrap_or_else(|_| format!("#{class}"))
    }

    /// C3 merge of the bases' resolution orders and the base list itself.
    fn linearize(&self, bases: &[ClassId]) -> Option<Vec<ClassId>> {
        let mut seqs: Vec<Vec<ClassId>> = bases
            .iter()
            .filter_map(|b| self.mro(*b).ok().map(<[ClassId]>::to_vec))
            .collect();
        seqs.push(bases.to_vec());

        let mut result = Vec::new();
        loop {
            seqs.retain(|s| !s.is_empty());
            if seqs.is_empty() {
                return Some(result);
            }
            let head = seqs
                .iter()
                .map(|s| s[0])
                .find(|c| !seqs.iter().any(|s| s[1..].contains(c)))?;
            result.push(head);
            for seq in &mut seqs {
                if seq[0] == head {
                    seq.remove(0);
                }
            }
        }
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}
