//! Mermaid diagram rendering for treap collections.
//!
//! The renderers consume only the read-only [`NodeView`](crate::treap::NodeView) introspection
//! interface and assign diagram ids by node identity, so a subtree shared between several
//! collections is drawn once and referenced from every subgraph that contains it. This makes
//! structural sharing directly visible when debugging or documenting tree shapes.
//!
//! # Examples
//!
//! ```
//! use persistent_collections::treap::TreapSet;
//! use persistent_collections::viz;
//!
//! let a: TreapSet<u32> = (1..20).collect();
//! let b: TreapSet<u32> = (10..30).collect();
//! let union = a.union(&b);
//!
//! let diagram = viz::set_diagram(&[("a", &a), ("b", &b), ("a+b", &union)]);
//! assert!(diagram.starts_with("graph TD"));
//! ```

use crate::treap::{NodeView, TreapMap, TreapSet};
use std::collections::HashMap;
use std::fmt::Display;

struct Diagram {
    output: String,
    names: HashMap<*const (), String>,
}

impl Diagram {
    fn new() -> Self {
        Diagram {
            output: String::from("graph TD\n"),
            names: HashMap::new(),
        }
    }

    // Returns `id["label"]` for a node, assigning the next id on first sight. Ids are keyed by
    // node identity, so shared nodes keep one id across subgraphs.
    fn node_ref<'a, T, U, L>(&mut self, node: NodeView<'a, T, U>, label: &L) -> String
    where
        L: Fn(NodeView<'a, T, U>) -> String,
    {
        let next = self.names.len();
        let id = self
            .names
            .entry(node.as_ptr())
            .or_insert_with(|| format!("n{}", next));
        format!("{}[\"{}\"]", id, label(node))
    }

    fn visit<'a, T, U, L>(&mut self, node: NodeView<'a, T, U>, label: &L)
    where
        L: Fn(NodeView<'a, T, U>) -> String,
    {
        if let Some(child) = node.left() {
            if !self.names.contains_key(&child.as_ptr()) {
                self.visit(child, label);
            }
            let line = format!(
                "{} -->|L| {}\n",
                self.node_ref(node, label),
                self.node_ref(child, label)
            );
            self.output.push_str(&line);
        }
        if let Some(child) = node.right() {
            if !self.names.contains_key(&child.as_ptr()) {
                self.visit(child, label);
            }
            let line = format!(
                "{} -->|R| {}\n",
                self.node_ref(node, label),
                self.node_ref(child, label)
            );
            self.output.push_str(&line);
        }
    }

    fn subgraph<'a, T, U, L>(&mut self, name: &str, root: Option<NodeView<'a, T, U>>, label: &L)
    where
        L: Fn(NodeView<'a, T, U>) -> String,
    {
        self.output.push_str(&format!("subgraph \"{}\"\n", name));
        if let Some(root) = root {
            if !self.names.contains_key(&root.as_ptr()) {
                if root.left().is_none() && root.right().is_none() {
                    let decl = self.node_ref(root, label);
                    self.output.push_str(&decl);
                    self.output.push('\n');
                } else {
                    self.visit(root, label);
                }
            }
        }
        self.output.push_str("end\n");
    }

    fn finish(self) -> String {
        self.output
    }
}

/// Renders a collection of named sets as a mermaid `graph TD` document, one subgraph per set.
/// Nodes shared between sets are drawn once and referenced from every containing subgraph.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::TreapSet;
/// use persistent_collections::viz;
///
/// let a = TreapSet::new().insert(1).insert(2);
/// println!("{}", viz::set_diagram(&[("a", &a)]));
/// ```
pub fn set_diagram<T>(sets: &[(&str, &TreapSet<T>)]) -> String
where
    T: Display,
{
    let mut diagram = Diagram::new();
    for (name, set) in sets {
        diagram.subgraph(name, set.root(), &|node: NodeView<'_, T, ()>| {
            node.key().to_string()
        });
    }
    diagram.finish()
}

/// Renders a collection of named maps as a mermaid `graph TD` document, one subgraph per map,
/// labelling each node with `key: value`.
///
/// # Examples
///
/// ```
/// use persistent_collections::treap::TreapMap;
/// use persistent_collections::viz;
///
/// let a = TreapMap::new().insert(1, "one").insert(2, "two");
/// println!("{}", viz::map_diagram(&[("a", &a)]));
/// ```
pub fn map_diagram<T, U>(maps: &[(&str, &TreapMap<T, U>)]) -> String
where
    T: Display,
    U: Display,
{
    let mut diagram = Diagram::new();
    for (name, map) in maps {
        diagram.subgraph(name, map.root(), &|node: NodeView<'_, T, U>| {
            format!("{}: {}", node.key(), node.value())
        });
    }
    diagram.finish()
}

#[cfg(test)]
mod tests {
    use super::{map_diagram, set_diagram};
    use crate::treap::{TreapMap, TreapSet};

    #[test]
    fn test_set_diagram_structure() {
        let set: TreapSet<u32> = (1..8).collect();
        let diagram = set_diagram(&[("a", &set)]);

        assert!(diagram.starts_with("graph TD\n"));
        assert!(diagram.contains("subgraph \"a\"\n"));
        assert!(diagram.contains("-->|L|") || diagram.contains("-->|R|"));
        assert!(diagram.ends_with("end\n"));
    }

    #[test]
    fn test_set_diagram_singleton() {
        let set = TreapSet::new().insert(1);
        let diagram = set_diagram(&[("a", &set)]);
        assert!(diagram.contains("n0[\"1\"]"));
    }

    #[test]
    fn test_set_diagram_shares_nodes() {
        let set: TreapSet<u32> = (1..8).collect();
        let diagram = set_diagram(&[("a", &set), ("same", &set)]);

        // The second subgraph introduces no nodes of its own.
        assert!(diagram.contains("subgraph \"same\"\nend\n"));
    }

    #[test]
    fn test_map_diagram_labels() {
        let map = TreapMap::new().insert(1, "one");
        let diagram = map_diagram(&[("a", &map)]);
        assert!(diagram.contains("[\"1: one\"]"));
    }
}
