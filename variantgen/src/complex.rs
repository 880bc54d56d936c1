//! Recursive shape of structured parameters
//!
//! A [`ComplexInterfaceTree`] documents the properties of a structured
//! parameter, and of their structured properties in turn. Nodes live in an
//! arena and refer to their children by [`NodeId`]. The type graph may be
//! self-referential, so construction keeps the set of [`TypeId`]s on the
//! current path and never descends into a type that is already on it.
//!
//! Densely cross-referencing types still multiply along distinct paths, so
//! expansion stops once a tree holds [`NODE_BUDGET`] nodes.

use crate::schema::{Schema, TypeId};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{trace, warn};

/// Nodes after which a tree stops expanding structured properties
pub const NODE_BUDGET: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One documented property (or the parameter itself, at the root)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexInterfaceInfo {
    pub name: String,
    pub type_id: TypeId,
    pub type_name: String,
    pub required: bool,
    pub description: String,
    /// Nested properties, in declaration order; empty for leaves
    pub nested: Vec<NodeId>,
    /// The type is structured and its properties were expanded here
    pub is_complex: bool,
    /// The type is structured but already being expanded further up the path
    pub is_recursive: bool,
    pub switch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexInterfaceTree {
    nodes: Vec<ComplexInterfaceInfo>,
    /// Some structured properties were left unexpanded to stay within budget
    truncated: bool,
}

impl ComplexInterfaceTree {
    /// Build the tree for a parameter, or `None` if its type is not structured
    pub fn build(
        schema: &Schema,
        name: &str,
        type_id: TypeId,
        required: bool,
        description: &str,
    ) -> Option<Self> {
        schema.complex_root(type_id)?;

        let mut tree = Self {
            nodes: Vec::new(),
            truncated: false,
        };
        let mut path = HashSet::new();
        tree.add_node(schema, name, type_id, required, description, &mut path);
        if tree.truncated {
            warn!(
                parameter = name,
                nodes = tree.nodes.len(),
                budget = NODE_BUDGET,
                "complex parameter notes truncated"
            );
        }
        Some(tree)
    }

    fn add_node(
        &mut self,
        schema: &Schema,
        name: &str,
        type_id: TypeId,
        required: bool,
        description: &str,
        path: &mut HashSet<TypeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let description = if description.is_empty() {
            schema
                .get(type_id)
                .map(|def| def.description.clone())
                .unwrap_or_default()
        } else {
            description.to_string()
        };

        self.nodes.push(ComplexInterfaceInfo {
            name: name.to_string(),
            type_id,
            type_name: schema.syntax_name(type_id),
            required,
            description,
            nested: Vec::new(),
            is_complex: false,
            is_recursive: false,
            switch: schema.is_switch(type_id),
        });

        if let Some(object) = schema.complex_root(type_id) {
            if self.nodes.len() >= NODE_BUDGET {
                self.truncated = true;
            } else if path.insert(object) {
                let nested: Vec<NodeId> = schema
                    .properties(object)
                    .iter()
                    .map(|property| {
                        self.add_node(
                            schema,
                            &property.name,
                            property.type_id,
                            property.required,
                            &property.description,
                            path,
                        )
                    })
                    .collect();
                path.remove(&object);

                let node = &mut self.nodes[id.0];
                node.nested = nested;
                node.is_complex = true;
            } else {
                trace!(property = name, "type already expanded on this path");
                self.nodes[id.0].is_recursive = true;
            }
        }

        id
    }

    pub fn root(&self) -> &ComplexInterfaceInfo {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&ComplexInterfaceInfo> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn children<'a>(
        &'a self,
        node: &'a ComplexInterfaceInfo,
    ) -> impl Iterator<Item = &'a ComplexInterfaceInfo> + 'a {
        node.nested.iter().filter_map(move |id| self.node(*id))
    }

    /// Pre-order walk yielding `(depth, node)`; the root has depth 0
    pub fn walk(&self) -> Vec<(usize, &ComplexInterfaceInfo)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, NodeId(0))];
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push((depth, node));
            for child in node.nested.iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Property, TypeKind};

    #[test]
    fn test_scalar_parameter_has_no_tree() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let schema = builder.build();

        assert!(ComplexInterfaceTree::build(&schema, "Name", string, true, "").is_none());
    }

    #[test]
    fn test_nested_object_tree() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let address = builder.object(
            "Address",
            vec![
                Property::new("Street", string).required(),
                Property::new("City", string),
            ],
        );
        let person = builder.object(
            "Person",
            vec![
                Property::new("Name", string).required(),
                Property::new("Home", address).with_description("Home address"),
            ],
        );
        let schema = builder.build();

        let tree = ComplexInterfaceTree::build(&schema, "Owner", person, true, "The owner")
            .expect("person is structured");
        let walked: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(depth, node)| (depth, node.name.as_str()))
            .collect();

        assert_eq!(
            walked,
            vec![
                (0, "Owner"),
                (1, "Name"),
                (1, "Home"),
                (2, "Street"),
                (2, "City"),
            ]
        );
        assert!(tree.root().is_complex);
        assert_eq!(tree.root().description, "The owner");
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let node = builder.declare("Node");
        builder.define(
            node,
            TypeKind::Object {
                properties: vec![Property::new("Value", string), Property::new("Next", node)],
            },
        );
        let schema = builder.build();

        let tree = ComplexInterfaceTree::build(&schema, "Head", node, false, "").unwrap();
        assert_eq!(tree.len(), 3);

        let next = tree
            .children(tree.root())
            .find(|n| n.name == "Next")
            .unwrap();
        assert!(next.is_recursive);
        assert!(next.nested.is_empty());
    }

    #[test]
    fn test_sibling_reuse_is_expanded_twice() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let tag = builder.object("Tag", vec![Property::new("Key", string)]);
        let pair = builder.object(
            "Pair",
            vec![Property::new("Left", tag), Property::new("Right", tag)],
        );
        let schema = builder.build();

        let tree = ComplexInterfaceTree::build(&schema, "Pair", pair, true, "").unwrap();
        let expanded = tree
            .children(tree.root())
            .filter(|n| n.is_complex && !n.is_recursive)
            .count();
        assert_eq!(expanded, 2);
    }

    #[test_log::test]
    fn test_cross_referencing_types_stop_at_the_node_budget() {
        let mut builder = Schema::builder();
        let ids: Vec<TypeId> = (0..8).map(|i| builder.declare(format!("T{i}"))).collect();
        for id in &ids {
            let properties = ids
                .iter()
                .enumerate()
                .map(|(i, other)| Property::new(format!("P{i}"), *other))
                .collect();
            builder.define(*id, TypeKind::Object { properties });
        }
        let schema = builder.build();

        let tree = ComplexInterfaceTree::build(&schema, "Root", ids[0], false, "").unwrap();
        assert!(tree.is_truncated());
        assert!(tree.len() < 2 * NODE_BUDGET);
        assert_eq!(tree.walk().len(), tree.len());
    }

    #[test]
    fn test_small_trees_are_not_truncated() {
        let mut builder = Schema::builder();
        let string = builder.scalar("String");
        let tag = builder.object("Tag", vec![Property::new("Key", string)]);
        let schema = builder.build();

        let tree = ComplexInterfaceTree::build(&schema, "Tag", tag, true, "").unwrap();
        assert!(!tree.is_truncated());
    }
}
